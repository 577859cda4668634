//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`. Command-line flags take
//! precedence over values from the file.
//!
//! ```yaml
//! schema:
//!   draft: draft4
//! log_format: json
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use charm_schema::{SchemaConfig, SchemaDraft};

/// Output format of log lines written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Schema engine settings.
    pub schema: SchemaConfig,
    /// Log line format.
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Load configuration from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        draft: Option<SchemaDraft>,
        log_format: Option<LogFormat>,
    ) -> Self {
        if let Some(draft) = draft {
            self.schema.draft = draft;
        }
        if let Some(log_format) = log_format {
            self.log_format = log_format;
        }
        self
    }
}
