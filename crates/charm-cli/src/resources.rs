//! # Resources Subcommand
//!
//! Parses and validates the resources a charm's metadata declares. Each
//! resource is reported on its own; one invalid entry does not stop the
//! others from being checked.
//!
//! ```bash
//! charm resources validate metadata.yaml
//! charm resources validate bundle.yaml --section charm.resources
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use charm_core::{lookup, GenericValue};
use charm_resource::{parse_resources, validate_resources};

/// Resources subcommand arguments.
#[derive(Args, Debug)]
pub struct ResourcesArgs {
    #[command(subcommand)]
    pub command: ResourcesCommand,
}

/// Available resources subcommands.
#[derive(Subcommand, Debug)]
pub enum ResourcesCommand {
    /// Validate every declared resource.
    Validate {
        /// Path to the metadata file.
        path: PathBuf,
        /// Dot-separated key path of the resources section.
        #[arg(long, default_value = "resources")]
        section: String,
    },
}

/// Execute the resources subcommand.
pub fn run_resources(args: &ResourcesArgs) -> Result<u8> {
    match &args.command {
        ResourcesCommand::Validate { path, section } => run_validate(path, section),
    }
}

fn run_validate(path: &Path, section: &str) -> Result<u8> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read metadata file: {}", path.display()))?;
    let document = GenericValue::from_yaml_str(&content)
        .with_context(|| format!("invalid metadata file: {}", path.display()))?;
    let top = document
        .to_string_map()
        .with_context(|| format!("metadata file must be a mapping: {}", path.display()))?
        .with_context(|| format!("invalid metadata file: {}", path.display()))?;

    let keys: Vec<&str> = section.split('.').collect();
    let Some(found) = lookup(&keys, &top) else {
        println!("No resources declared under {section:?} in {}", path.display());
        return Ok(0);
    };

    let resources = parse_resources(&found)
        .with_context(|| format!("invalid resources section {section:?}"))?;
    let results = validate_resources(&resources);

    let mut failed = 0usize;
    for (name, result) in &results {
        match result {
            Ok(()) => println!("  OK    {name}"),
            Err(e) => {
                failed += 1;
                tracing::warn!(resource = *name, error = %e, "resource failed validation");
                println!("  FAIL  {name}: {e}");
            }
        }
    }
    println!();
    println!("{} resource(s), {failed} failed", results.len());

    Ok(u8::from(failed > 0))
}
