//! # Actions Subcommand
//!
//! Builds the action schemas declared in an `actions.yaml` file.
//!
//! ```bash
//! charm actions validate actions.yaml
//! charm actions schema actions.yaml snapshot
//! charm actions check actions.yaml snapshot --params '{"outfile": "out.tgz"}'
//! charm actions check actions.yaml snapshot --params @params.yaml
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;

use charm_core::GenericValue;
use charm_schema::{
    read_actions_yaml, ActionSpec, ActionsCollection, ActionsError, SchemaValidator,
};

/// Actions subcommand arguments.
#[derive(Args, Debug)]
pub struct ActionsArgs {
    #[command(subcommand)]
    pub command: ActionsCommand,
}

/// Available actions subcommands.
#[derive(Subcommand, Debug)]
pub enum ActionsCommand {
    /// Build every action schema and report the declared actions.
    Validate {
        /// Path to the actions.yaml file.
        path: PathBuf,
    },

    /// Print the built schema document of one action as JSON.
    Schema {
        /// Path to the actions.yaml file.
        path: PathBuf,
        /// Action name.
        action: String,
    },

    /// Validate invocation parameters against an action's schema.
    Check {
        /// Path to the actions.yaml file.
        path: PathBuf,
        /// Action name.
        action: String,
        /// Parameters as inline JSON/YAML, or `@file` to read them from a file.
        #[arg(long)]
        params: String,
    },
}

/// Execute the actions subcommand.
pub fn run_actions(args: &ActionsArgs, validator: &SchemaValidator) -> Result<u8> {
    match &args.command {
        ActionsCommand::Validate { path } => run_validate(path, validator),
        ActionsCommand::Schema { path, action } => run_schema(path, action, validator),
        ActionsCommand::Check {
            path,
            action,
            params,
        } => run_check(path, action, params, validator),
    }
}

fn run_validate(path: &Path, validator: &SchemaValidator) -> Result<u8> {
    let actions = load_actions(path, validator)?;
    for (name, spec) in actions.iter() {
        println!("  {:<24} {}", name.as_str(), spec.description);
    }
    println!();
    println!("OK: {} action(s) in {}", actions.len(), path.display());
    Ok(0)
}

fn run_schema(path: &Path, action: &str, validator: &SchemaValidator) -> Result<u8> {
    let actions = load_actions(path, validator)?;
    let spec = find_action(&actions, action, path)?;
    let rendered = serde_json::to_string_pretty(&Value::Object(spec.params.clone()))
        .context("failed to render schema document")?;
    println!("{rendered}");
    Ok(0)
}

fn run_check(path: &Path, action: &str, params: &str, validator: &SchemaValidator) -> Result<u8> {
    let actions = load_actions(path, validator)?;
    let spec = find_action(&actions, action, path)?;
    let params = parse_params(params)?;

    match spec.validate_params_with(validator, &params) {
        Ok(()) => {
            println!("OK: parameters for action {action:?} are valid");
            Ok(0)
        }
        Err(e @ ActionsError::ParameterValidationFailed { .. }) => {
            tracing::warn!(action, "parameters rejected");
            println!("FAIL: {e}");
            Ok(1)
        }
        Err(e) => Err(e).with_context(|| format!("failed to check parameters for {action:?}")),
    }
}

/// Read and build an actions file.
pub fn load_actions(path: &Path, validator: &SchemaValidator) -> Result<ActionsCollection> {
    let file = File::open(path)
        .with_context(|| format!("failed to open actions file: {}", path.display()))?;
    let actions = read_actions_yaml(validator, file)
        .with_context(|| format!("invalid actions file: {}", path.display()))?;
    tracing::info!(path = %path.display(), actions = actions.len(), "loaded actions");
    Ok(actions)
}

fn find_action<'a>(
    actions: &'a ActionsCollection,
    action: &str,
    path: &Path,
) -> Result<&'a ActionSpec> {
    actions
        .get(action)
        .with_context(|| format!("no action named {action:?} in {}", path.display()))
}

/// Parse inline parameters, or read them from a file when prefixed with `@`.
///
/// YAML is a superset of JSON, so both forms are accepted.
fn parse_params(raw: &str) -> Result<GenericValue> {
    let text = match raw.strip_prefix('@') {
        Some(file) => std::fs::read_to_string(file)
            .with_context(|| format!("failed to read params file: {file}"))?,
        None => raw.to_string(),
    };
    GenericValue::from_yaml_str(&text).context("invalid params")
}
