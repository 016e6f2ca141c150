//! # Validate Subcommand
//!
//! Validates one document against a schema taken from the environment.
//! The environment is built from an optional configuration file plus any
//! `--schema-dir` directories. When `--schema` names no registered
//! document but points at an existing file, that file is registered under
//! the given path first.
//!
//! `--use-coerce` applies the text coercions registered by
//! [`register_text_coercions`]: strings spelling an integer, number, or
//! boolean are converted before the `type` check.
//!
//! Exit codes: `0` when the document is valid, `1` when it has violations,
//! `2` when the schema or document cannot be loaded.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use valtree_core::ErrorTree;
use valtree_schema::{load_document, Environment, PartialOptions};

/// Arguments for the `valtree validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Document to validate (JSON, or YAML by `.yaml`/`.yml` extension).
    pub document: PathBuf,

    /// Schema identifier, `name#/pointer`, or path to a schema file.
    #[arg(long, short)]
    pub schema: String,

    /// Directory of schema files to register. Repeatable.
    #[arg(long = "schema-dir", value_name = "DIR")]
    pub schema_dirs: Vec<PathBuf>,

    /// Environment configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fill missing or empty values from schema defaults.
    #[arg(long)]
    pub use_default: bool,

    /// Convert strings spelling integers, numbers, or booleans before type checks.
    #[arg(long)]
    pub use_coerce: bool,

    /// Delete properties the schema does not declare.
    #[arg(long)]
    pub remove_additional: bool,

    /// Do not enforce `required`.
    #[arg(long)]
    pub no_check_required: bool,

    /// Report structural errors inside `schema` envelopes.
    #[arg(long)]
    pub legacy: bool,

    /// Print the document after validation, including any mutations.
    #[arg(long)]
    pub write: bool,
}

impl ValidateArgs {
    /// Overrides for the flags actually given; everything else inherits
    /// from the environment defaults.
    pub fn overrides(&self) -> PartialOptions {
        let mut options = PartialOptions::new();
        if self.use_default {
            options = options.use_default(true);
        }
        if self.use_coerce {
            options = options.use_coerce(true);
        }
        if self.remove_additional {
            options = options.remove_additional(true);
        }
        if self.no_check_required {
            options = options.check_required(false);
        }
        if self.legacy {
            options = options.use_legacy_validation(true);
        }
        options
    }
}

/// Result of validating one document.
#[derive(Debug)]
pub struct Outcome {
    /// Violations, or `None` for a valid document.
    pub errors: Option<ErrorTree>,
    /// The document as left by validation.
    pub document: Value,
}

/// Build the environment described by `args`.
pub fn build_environment(args: &ValidateArgs) -> Result<Environment> {
    let mut env = match &args.config {
        Some(path) => Environment::from_config_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Environment::new(),
    };

    for dir in &args.schema_dirs {
        let count = env
            .load_schema_dir(dir)
            .with_context(|| format!("failed to load schema directory {}", dir.display()))?;
        tracing::info!(dir = %dir.display(), count, "registered schema directory");
    }

    register_text_coercions(&mut env);

    let schema_path = Path::new(&args.schema);
    if !env.contains_schema(&args.schema) && schema_path.is_file() {
        let schema = load_document(schema_path)?;
        env.add_schema_as(&args.schema, schema)?;
        tracing::debug!(schema = %args.schema, "registered schema file");
    }
    Ok(env)
}

/// Register coercions from text for `integer`, `number`, and `boolean`.
///
/// Values that do not parse are passed through unchanged, so the `type`
/// check still reports them.
pub fn register_text_coercions(env: &mut Environment) {
    env.add_type_coercion("integer", |value| {
        let parsed = value
            .as_str()
            .and_then(|text| text.trim().parse::<i64>().ok());
        parsed.map_or(value, Value::from)
    });
    env.add_type_coercion("number", |value| {
        let parsed = value
            .as_str()
            .and_then(|text| text.trim().parse::<f64>().ok())
            .and_then(serde_json::Number::from_f64);
        parsed.map_or(value, Value::Number)
    });
    env.add_type_coercion("boolean", |value| {
        let parsed = match value.as_str() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };
        parsed.map_or(value, Value::Bool)
    });
}

/// Validate the document named by `args`.
pub fn validate_document(args: &ValidateArgs) -> Result<Outcome> {
    let env = build_environment(args)?;
    let mut document = load_document(&args.document)?;
    let errors = env
        .validate_with(args.schema.as_str(), &mut document, &args.overrides())
        .with_context(|| format!("cannot validate {}", args.document.display()))?;
    Ok(Outcome { errors, document })
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let outcome = validate_document(args)?;

    match &outcome.errors {
        Some(errors) => {
            tracing::info!(document = %args.document.display(), violations = errors.violations().len(), "document is invalid");
            eprintln!("{errors}");
            println!("{}", serde_json::to_string_pretty(&errors.to_value())?);
            Ok(1)
        }
        None if args.write => {
            println!("{}", render_document(&args.document, &outcome.document)?);
            Ok(0)
        }
        None => {
            println!("valid");
            Ok(0)
        }
    }
}

/// Render `document` in the format its source file used.
fn render_document(source: &Path, document: &Value) -> Result<String> {
    let yaml = matches!(
        source.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    if yaml {
        Ok(serde_yaml::to_string(document)?)
    } else {
        Ok(serde_json::to_string_pretty(document)?)
    }
}
