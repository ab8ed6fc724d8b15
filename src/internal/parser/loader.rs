// src/internal/parser/loader.rs

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::internal::error::SpecLoadError;

/// Parsed API description, kept as a raw JSON tree.
///
/// Operations are decoded lazily, one at a time, so that a single malformed
/// entry cannot poison the whole document.
#[derive(Debug, Clone)]
pub struct ApiDocument {
    paths: Map<String, Value>,
    /// Everything except `paths`; target of `$ref` lookups.
    root: Value,
}

impl ApiDocument {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SpecLoadError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| SpecLoadError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_slice(&data)
    }

    /// Detect and parse the description: JSON first, then YAML.
    pub fn from_slice(data: &[u8]) -> Result<Self, SpecLoadError> {
        let root = match serde_json::from_slice::<Value>(data) {
            Ok(root) => {
                info!("Parsed API description as JSON");
                root
            }
            Err(json_err) => match serde_yaml::from_slice::<serde_yaml::Value>(data) {
                Ok(yaml) => {
                    info!("Parsed API description as YAML");
                    yaml_to_json(yaml)
                }
                Err(yaml_err) => {
                    return Err(SpecLoadError::Parse {
                        json: json_err.to_string(),
                        yaml: yaml_err.to_string(),
                    })
                }
            },
        };

        Self::from_value(root)
    }

    pub fn from_value(mut root: Value) -> Result<Self, SpecLoadError> {
        let object = root.as_object_mut().ok_or(SpecLoadError::NotAMapping)?;
        match object.remove("paths") {
            Some(Value::Object(paths)) => Ok(Self { paths, root }),
            _ => Err(SpecLoadError::MissingPaths),
        }
    }

    /// Path items in document order.
    pub fn paths(&self) -> &Map<String, Value> {
        &self.paths
    }

    pub fn title(&self) -> Option<&str> {
        self.root.pointer("/info/title").and_then(Value::as_str)
    }

    /// Follow a local `#/...` reference one hop. Remote references are not
    /// supported and resolve to `None`.
    pub fn resolve_ref(&self, reference: &str) -> Option<&Value> {
        let pointer = reference.strip_prefix('#')?;
        if !pointer.is_empty() && !pointer.starts_with('/') {
            return None;
        }
        self.root.pointer(pointer)
    }
}

/// Convert a YAML tree to JSON. Non-string mapping keys (status codes such
/// as `200:`) are stringified.
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
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => Value::Array(seq.into_iter().map(yaml_to_json).collect()),
        serde_yaml::Value::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_json(v)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_status_codes_become_string_keys() {
        let doc = ApiDocument::from_slice(
            b"openapi: 3.0.0\npaths:\n  /a:\n    get:\n      responses:\n        200:\n          description: ok\n",
        )
        .unwrap();

        let op = &doc.paths()["/a"]["get"];
        assert!(op["responses"].get("200").is_some());
    }

    #[test]
    fn test_json_is_preferred() {
        let doc = ApiDocument::from_slice(br#"{"openapi":"3.0.0","info":{"title":"T"},"paths":{}}"#)
            .unwrap();
        assert_eq!(doc.title(), Some("T"));
        assert!(doc.paths().is_empty());
    }

    #[test]
    fn test_missing_paths_is_fatal() {
        let err = ApiDocument::from_slice(b"openapi: 3.0.0\ninfo:\n  title: x\n").unwrap_err();
        assert!(matches!(err, SpecLoadError::MissingPaths));
    }

    #[test]
    fn test_scalar_root_is_fatal() {
        let err = ApiDocument::from_slice(b"just a string").unwrap_err();
        assert!(matches!(err, SpecLoadError::NotAMapping));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let err = ApiDocument::from_slice(b"{ not: [valid").unwrap_err();
        assert!(matches!(err, SpecLoadError::Parse { .. }));
    }

    #[test]
    fn test_resolve_ref() {
        let doc = ApiDocument::from_value(serde_json::json!({
            "paths": {},
            "components": {"parameters": {"Limit": {"name": "limit", "in": "query"}}}
        }))
        .unwrap();

        assert_eq!(
            doc.resolve_ref("#/components/parameters/Limit").unwrap()["name"],
            "limit"
        );
        assert!(doc.resolve_ref("#/components/parameters/Nope").is_none());
        assert!(doc.resolve_ref("other.yaml#/Limit").is_none());
    }
}
