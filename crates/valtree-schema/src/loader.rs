//! # Schema and Document Loading
//!
//! Reads JSON and YAML files into `serde_json::Value` trees. YAML input is
//! converted node by node: tags are dropped, and scalar map keys are
//! stringified.
//!
//! [`Environment::load_schema_dir`] registers every schema file of a
//! directory so `$ref`s between them resolve by file name or by `id`.

use std::path::Path;

use serde_json::Value;
use valtree_core::ValtreeError;

use crate::environment::Environment;

/// File extensions recognised as schema or document files.
pub const SCHEMA_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

impl Environment {
    /// Register each `*.json`, `*.yaml` and `*.yml` file in `dir` under its
    /// file name (and its `id`, when present). Files are loaded in name
    /// order. Returns the number of documents registered.
    pub fn load_schema_dir(&mut self, dir: &Path) -> Result<usize, ValtreeError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && has_schema_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| ValtreeError::SchemaLoad {
                    schema_name: path.display().to_string(),
                    reason: "file name is not valid UTF-8".to_string(),
                })?;
            let schema = read_value(path).map_err(|reason| ValtreeError::SchemaLoad {
                schema_name: name.to_string(),
                reason,
            })?;
            self.add_schema_as(name, schema)?;
        }

        tracing::debug!(dir = %dir.display(), count = paths.len(), "loaded schema directory");
        Ok(paths.len())
    }
}

/// Read a JSON or YAML document, choosing the parser by file extension.
/// Anything other than `.yaml`/`.yml` is parsed as JSON.
pub fn load_document(path: &Path) -> Result<Value, ValtreeError> {
    read_value(path).map_err(|reason| ValtreeError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    })
}

fn has_schema_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCHEMA_EXTENSIONS.contains(&ext))
}

pub(crate) fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

pub(crate) fn read_value(path: &Path) -> Result<Value, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read file: {e}"))?;
    parse_value(&content, is_yaml_path(path))
}

pub(crate) fn parse_value(content: &str, yaml: bool) -> Result<Value, String> {
    if yaml {
        let parsed: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| format!("invalid YAML: {e}"))?;
        yaml_to_json_value(&parsed)
    } else {
        serde_json::from_str(content).map_err(|e| format!("invalid JSON: {e}"))
    }
}

/// Convert a `serde_yaml::Value` tree into the equivalent JSON tree.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    match yaml {
        Yaml::Null => Ok(Value::Null),
        Yaml::Bool(b) => Ok(Value::Bool(*b)),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        Yaml::String(s) => Ok(Value::String(s.clone())),
        Yaml::Sequence(items) => items
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Yaml::Mapping(map) => {
            let mut object = serde_json::Map::new();
            for (key, value) in map {
                let key = match key {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key: {other:?}")),
                };
                object.insert(key, yaml_to_json_value(value)?);
            }
            Ok(Value::Object(object))
        }
        Yaml::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
