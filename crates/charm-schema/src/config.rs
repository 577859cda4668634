//! # Schema Configuration
//!
//! Selects the JSON Schema draft used for both the schema self-check and
//! parameter validation. Action schemas are authored against Draft 4,
//! which is the default.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// JSON Schema drafts the engine can be configured with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaDraft {
    /// Draft 4.
    #[default]
    #[serde(rename = "draft4")]
    Draft4,
    /// Draft 6.
    #[serde(rename = "draft6")]
    Draft6,
    /// Draft 7.
    #[serde(rename = "draft7")]
    Draft7,
    /// Draft 2019-09.
    #[serde(rename = "draft2019-09")]
    Draft201909,
    /// Draft 2020-12.
    #[serde(rename = "draft2020-12")]
    Draft202012,
}

impl SchemaDraft {
    /// Returns the identifier used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft4 => "draft4",
            Self::Draft6 => "draft6",
            Self::Draft7 => "draft7",
            Self::Draft201909 => "draft2019-09",
            Self::Draft202012 => "draft2020-12",
        }
    }

    pub(crate) fn to_engine(self) -> jsonschema::Draft {
        match self {
            Self::Draft4 => jsonschema::Draft::Draft4,
            Self::Draft6 => jsonschema::Draft::Draft6,
            Self::Draft7 => jsonschema::Draft::Draft7,
            Self::Draft201909 => jsonschema::Draft::Draft201909,
            Self::Draft202012 => jsonschema::Draft::Draft202012,
        }
    }
}

impl std::fmt::Display for SchemaDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaDraft {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft4" => Ok(Self::Draft4),
            "draft6" => Ok(Self::Draft6),
            "draft7" => Ok(Self::Draft7),
            "draft2019-09" => Ok(Self::Draft201909),
            "draft2020-12" => Ok(Self::Draft202012),
            other => Err(format!(
                "unknown schema draft {other:?} \
                 (expected draft4, draft6, draft7, draft2019-09 or draft2020-12)"
            )),
        }
    }
}

/// Settings for the schema engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    /// Draft used to compile action schemas.
    pub draft: SchemaDraft,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_draft4() {
        assert_eq!(SchemaConfig::default().draft, SchemaDraft::Draft4);
    }

    #[test]
    fn test_parse_round_trips_identifiers() {
        for draft in [
            SchemaDraft::Draft4,
            SchemaDraft::Draft6,
            SchemaDraft::Draft7,
            SchemaDraft::Draft201909,
            SchemaDraft::Draft202012,
        ] {
            assert_eq!(draft.as_str().parse::<SchemaDraft>().unwrap(), draft);
        }
    }

    #[test]
    fn test_parse_unknown_draft_fails() {
        let err = "draft3".parse::<SchemaDraft>().unwrap_err();
        assert!(err.contains("draft3"));
    }

    #[test]
    fn test_config_from_yaml() {
        let config: SchemaConfig = serde_yaml::from_str("draft: draft7\n").unwrap();
        assert_eq!(config.draft, SchemaDraft::Draft7);

        let empty: SchemaConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(empty, SchemaConfig::default());
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        assert!(serde_yaml::from_str::<SchemaConfig>("drafts: draft7\n").is_err());
    }
}
