//! Loading topology documents from YAML or JSON files.
//!
//! Everything is decoded into an order-preserving `serde_json::Value`, which
//! is what the generator takes. YAML mapping keys that are not strings
//! (`1:`, `true:`) are stringified on the way in.

use std::path::Path;

use serde_json::{Map, Number, Value};

use crate::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Format implied by the file extension, if any.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Read and decode a document.
pub async fn load(path: &Path) -> Result<Value, CliError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read { path: path.to_path_buf(), source })?;
    let value = decode(&text, Format::from_path(path))?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "loaded document");
    Ok(value)
}

/// Decode `text`. Without a known format, JSON is tried first, then YAML.
pub fn decode(text: &str, format: Option<Format>) -> Result<Value, CliError> {
    match format {
        Some(Format::Json) => Ok(serde_json::from_str(text)?),
        Some(Format::Yaml) => Ok(yaml_to_json(serde_yaml::from_str(text)?)),
        None => match serde_json::from_str(text) {
            Ok(value) => Ok(value),
            Err(_) => Ok(yaml_to_json(serde_yaml::from_str(text)?)),
        },
    }
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => yaml_number(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        serde_yaml::Value::Mapping(mapping) => {
            let mut out = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                out.insert(key_string(&key), yaml_to_json(value));
            }
            Value::Object(out)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(u) = n.as_u64() {
        return Value::Number(u.into());
    }
    if let Some(i) = n.as_i64() {
        return Value::Number(i.into());
    }
    n.as_f64().and_then(Number::from_f64).map_or(Value::Null, Value::Number)
}

fn key_string(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Tagged(tagged) => key_string(&tagged.value),
        other => serde_yaml::to_string(other).map_or_else(|_| String::new(), |s| s.trim().to_string()),
    }
}

#[cfg(test)]
#[path = "document_test.rs"]
mod tests;
