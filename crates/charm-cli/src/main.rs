//! # charm CLI entry point
//!
//! Parses command-line arguments, loads configuration and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use charm_cli::actions::{run_actions, ActionsArgs};
use charm_cli::resources::{run_resources, ResourcesArgs};
use charm_cli::{CliConfig, LogFormat};
use charm_schema::{SchemaDraft, SchemaValidator};

/// Charm metadata tooling.
///
/// Builds and checks action schemas from `actions.yaml` and validates the
/// resources a charm declares.
#[derive(Parser, Debug)]
#[command(name = "charm", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log line format (overrides the configuration file).
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    /// JSON Schema draft used for action schemas (overrides the configuration file).
    #[arg(long, global = true)]
    draft: Option<SchemaDraft>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build action schemas and check invocation parameters.
    Actions(ActionsArgs),

    /// Validate declared resources.
    Resources(ResourcesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config.with_overrides(cli.draft, cli.log_format),
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(2);
        }
    };

    init_tracing(cli.verbose, config.log_format);
    tracing::debug!(draft = %config.schema.draft, "charm CLI starting");

    let validator = SchemaValidator::new(config.schema);
    let result = match &cli.command {
        Commands::Actions(args) => run_actions(args, &validator),
        Commands::Resources(args) => run_resources(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// Initialize tracing based on verbosity level. `RUST_LOG` is not consulted.
fn init_tracing(verbose: u8, format: LogFormat) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charm_cli::actions::ActionsCommand;
    use charm_cli::resources::ResourcesCommand;

    #[test]
    fn cli_parse_actions_validate() {
        let cli = Cli::try_parse_from(["charm", "actions", "validate", "actions.yaml"]).unwrap();
        if let Commands::Actions(args) = cli.command {
            assert!(matches!(
                args.command,
                ActionsCommand::Validate { ref path } if path == &PathBuf::from("actions.yaml")
            ));
        } else {
            panic!("expected actions command");
        }
    }

    #[test]
    fn cli_parse_actions_check() {
        let cli = Cli::try_parse_from([
            "charm",
            "actions",
            "check",
            "actions.yaml",
            "snapshot",
            "--params",
            "{}",
        ])
        .unwrap();
        if let Commands::Actions(args) = cli.command {
            if let ActionsCommand::Check { action, params, .. } = args.command {
                assert_eq!(action, "snapshot");
                assert_eq!(params, "{}");
                return;
            }
        }
        panic!("expected actions check command");
    }

    #[test]
    fn cli_parse_check_requires_params() {
        assert!(
            Cli::try_parse_from(["charm", "actions", "check", "actions.yaml", "snapshot"]).is_err()
        );
    }

    #[test]
    fn cli_parse_resources_default_section() {
        let cli = Cli::try_parse_from(["charm", "resources", "validate", "metadata.yaml"]).unwrap();
        if let Commands::Resources(args) = cli.command {
            let ResourcesCommand::Validate { section, .. } = args.command;
            assert_eq!(section, "resources");
        } else {
            panic!("expected resources command");
        }
    }

    #[test]
    fn cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "charm",
            "-vv",
            "--draft",
            "draft7",
            "--log-format",
            "json",
            "resources",
            "validate",
            "metadata.yaml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.draft, Some(SchemaDraft::Draft7));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn cli_parse_unknown_draft_fails() {
        let parsed =
            Cli::try_parse_from(["charm", "--draft", "draft99", "resources", "validate", "m.yaml"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn cli_parse_missing_subcommand_fails() {
        assert!(Cli::try_parse_from(["charm"]).is_err());
    }
}
