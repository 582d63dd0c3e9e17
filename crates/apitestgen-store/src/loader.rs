//! OpenAPI document loader
//!
//! Reads a contract file and yields the raw document the parser consumes.
//! `.json` is parsed as JSON, `.yaml`/`.yml` as YAML; any other extension is
//! tried as JSON first, then YAML.

#![allow(clippy::result_large_err)]

use crate::errors::{document_error, io_error_at, Result};
use apitestgen_core::errors::{ExError, ExErrorKind};
use serde_json::{Map, Number, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Load a contract file into a JSON value.
///
/// # Errors
///
/// - `InvalidInput` if the file does not exist
/// - `Io` if it cannot be read
/// - `InvalidDocument` if it is neither valid JSON nor valid YAML
pub fn load_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("load_document")
                .with_file_path(path.display().to_string())
                .with_message("contract file not found")
        } else {
            io_error_at("load_document", path, e)
        }
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let document = match extension.as_deref() {
        Some("json") => parse_json(&content).map_err(|e| document_error(path, &e))?,
        Some("yaml") | Some("yml") => parse_yaml(&content).map_err(|e| document_error(path, &e))?,
        _ => parse_json(&content)
            .or_else(|_| parse_yaml(&content))
            .map_err(|e| document_error(path, &e))?,
    };

    tracing::debug!(path = %path.display(), "contract document loaded");
    Ok(document)
}

fn parse_json(content: &str) -> std::result::Result<Value, String> {
    serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
}

fn parse_yaml(content: &str) -> std::result::Result<Value, String> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))?;
    Ok(yaml_to_json(yaml))
}

/// YAML allows non-string keys (`200:` in `responses`); JSON does not, so
/// scalar keys are rendered as text.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(yaml_key(key), yaml_to_json(value));
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Null => "null".to_string(),
        other => match yaml_to_json(other) {
            Value::String(s) => s,
            json => json.to_string(),
        },
    }
}
