//! # valtree CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use valtree_cli::validate::{run_validate, ValidateArgs};

/// Validate JSON and YAML documents against JSON-Schema-style schemas.
#[derive(Parser, Debug)]
#[command(name = "valtree", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a document and print its error tree.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flags when set.
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_parse_validate_minimal() {
        let cli = Cli::try_parse_from(["valtree", "validate", "doc.json", "--schema", "user"]).unwrap();
        let Commands::Validate(args) = cli.command;
        assert_eq!(args.document, PathBuf::from("doc.json"));
        assert_eq!(args.schema, "user");
        assert!(args.schema_dirs.is_empty());
        assert!(!args.use_default);
        assert!(!args.write);
    }

    #[test]
    fn test_cli_parse_validate_all_flags() {
        let cli = Cli::try_parse_from([
            "valtree",
            "-vv",
            "validate",
            "doc.yaml",
            "-s",
            "lib://order#/definitions/line",
            "--schema-dir",
            "schemas",
            "--schema-dir",
            "vendor",
            "--config",
            "valtree.yaml",
            "--use-default",
            "--use-coerce",
            "--remove-additional",
            "--no-check-required",
            "--legacy",
            "--write",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Validate(args) = cli.command;
        assert_eq!(args.schema, "lib://order#/definitions/line");
        assert_eq!(args.schema_dirs, vec![PathBuf::from("schemas"), PathBuf::from("vendor")]);
        assert_eq!(args.config, Some(PathBuf::from("valtree.yaml")));
        assert!(args.use_default && args.use_coerce && args.remove_additional);
        assert!(args.no_check_required && args.legacy && args.write);
    }

    #[test]
    fn test_cli_parse_requires_schema() {
        assert!(Cli::try_parse_from(["valtree", "validate", "doc.json"]).is_err());
    }
}
