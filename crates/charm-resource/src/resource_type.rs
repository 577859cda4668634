//! # Resource Type
//!
//! The kinds of resource a charm may declare. `Unknown` is the zero value
//! a descriptor carries when its `type` field was absent or unreadable;
//! it never parses from text.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use charm_core::CharmError;

/// The kind of a declared resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Sentinel for an absent or unparseable type.
    #[default]
    Unknown,
    /// A single file stored under the resource's directory.
    File,
}

impl ResourceType {
    /// Every type that may appear in metadata.
    pub fn supported() -> &'static [ResourceType] {
        &[Self::File]
    }

    /// Returns the identifier used in metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::File => "file",
        }
    }

    /// Check that this is a recognized type.
    ///
    /// # Errors
    ///
    /// Returns [`CharmError::NotValid`] for [`ResourceType::Unknown`].
    pub fn validate(&self) -> Result<(), CharmError> {
        if Self::supported().contains(self) {
            Ok(())
        } else {
            Err(CharmError::NotValid(format!(
                "unsupported resource type {:?}",
                self.as_str()
            )))
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = CharmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            other => Err(CharmError::NotValid(format!(
                "unsupported resource type {other:?}"
            ))),
        }
    }
}
