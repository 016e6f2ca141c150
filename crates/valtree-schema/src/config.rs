//! # Environment Configuration
//!
//! An environment can be described by a YAML or JSON file:
//!
//! ```yaml
//! options:
//!   useDefault: true
//!   removeAdditional: true
//! schemaDirs:
//!   - schemas
//! schemas:
//!   draft-04: vendor/draft-04-schema.json
//! ```
//!
//! Relative paths are resolved against the directory holding the file.
//! Directories are loaded before the individually named schemas, so a
//! named entry replaces a directory entry with the same key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use valtree_core::ValtreeError;

use crate::environment::Environment;
use crate::loader::{is_yaml_path, read_value};
use crate::options::PartialOptions;

/// Parsed environment configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Overrides applied over the built-in default options.
    pub options: PartialOptions,
    /// Directories loaded with [`Environment::load_schema_dir`].
    pub schema_dirs: Vec<PathBuf>,
    /// Schemas registered under an explicit name.
    pub schemas: BTreeMap<String, PathBuf>,
}

impl EnvironmentConfig {
    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ValtreeError> {
        let config_error = |reason: String| ValtreeError::Config {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_error(format!("cannot read file: {e}")))?;
        if is_yaml_path(path) {
            serde_yaml::from_str(&content).map_err(|e| config_error(format!("invalid YAML: {e}")))
        } else {
            serde_json::from_str(&content).map_err(|e| config_error(format!("invalid JSON: {e}")))
        }
    }

    /// Build an environment from this configuration. Relative paths are
    /// taken relative to `base`.
    pub fn build(&self, base: &Path) -> Result<Environment, ValtreeError> {
        let mut env = Environment::new();
        env.set_default_options(self.options.resolve(env.default_options()));

        for dir in &self.schema_dirs {
            env.load_schema_dir(&base.join(dir))?;
        }
        for (name, file) in &self.schemas {
            let path = base.join(file);
            let schema = read_value(&path).map_err(|reason| ValtreeError::SchemaLoad {
                schema_name: name.clone(),
                reason,
            })?;
            env.add_schema_as(name, schema)?;
        }
        Ok(env)
    }
}

impl Environment {
    /// Build an environment from a configuration file.
    pub fn from_config_file(path: &Path) -> Result<Self, ValtreeError> {
        let config = EnvironmentConfig::from_file(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let env = config.build(base)?;
        tracing::debug!(config = %path.display(), schemas = env.schema_ids().len(), "environment configured");
        Ok(env)
    }
}
