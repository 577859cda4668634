//! # charm-cli — CLI Tool for Charm Metadata
//!
//! Provides the `charm` command-line interface over the metadata crates.
//!
//! ## Subcommands
//!
//! - `charm actions validate` — build every action schema in an actions file.
//! - `charm actions schema` — print one action's built schema document.
//! - `charm actions check` — validate invocation parameters.
//! - `charm resources validate` — validate declared resources.
//!
//! ```bash
//! charm actions validate actions.yaml
//! charm actions check actions.yaml snapshot --params '{"outfile": "out.tgz"}'
//! charm resources validate metadata.yaml
//! ```
//!
//! Every handler returns the process exit code: `0` on success, `1` when
//! the input was read but failed validation. Hard failures (unreadable
//! files, malformed YAML) surface as errors.

pub mod actions;
pub mod config;
pub mod resources;

pub use config::{CliConfig, LogFormat};
