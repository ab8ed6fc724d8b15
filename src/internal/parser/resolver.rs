// src/internal/parser/resolver.rs

use anyhow::{anyhow, bail, Result};
use openapiv3::{Parameter, ParameterData, ParameterSchemaOrContent, ReferenceOr, Schema, SchemaKind, Type};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::{debug, warn};

use super::loader::ApiDocument;
use super::types::{ParamDescriptor, ParamLocation, ParamType, ScalarType};

/// Keys kept when summarizing a schema node.
const SHALLOW_KEYS: [&str; 4] = ["type", "format", "enum", "title"];

/// ParamResolver reads parameter and response schemas one level deep.
///
/// A `$ref` is followed a single hop to read the top-level type of the
/// referenced node; nested `items`/`properties` are never inlined.
pub struct ParamResolver<'a> {
    doc: &'a ApiDocument,
}

impl<'a> ParamResolver<'a> {
    pub fn new(doc: &'a ApiDocument) -> Self {
        Self { doc }
    }

    /// Resolve the ordered parameter list for one GET operation.
    ///
    /// Path-level parameters are overridden by operation-level ones with the
    /// same name and location. Header and cookie parameters are dropped.
    /// The result holds path parameters first, then query parameters.
    pub fn resolve(
        &self,
        path: &str,
        path_level: &[Value],
        operation_level: &[Value],
    ) -> Result<Vec<ParamDescriptor>> {
        let mut merged: Vec<ParamDescriptor> = Vec::new();

        for param in path_level.iter().chain(operation_level) {
            let Some(descriptor) = self.inline(param)? else {
                continue;
            };
            match merged
                .iter_mut()
                .find(|p| p.name == descriptor.name && p.location == descriptor.location)
            {
                Some(existing) => *existing = descriptor,
                None => merged.push(descriptor),
            }
        }

        // Placeholders nobody declared are still path parameters.
        for name in path_placeholders(path) {
            if !merged
                .iter()
                .any(|p| p.name == name && p.location == ParamLocation::Path)
            {
                debug!("Synthesizing undeclared path parameter '{}' for {}", name, path);
                merged.push(ParamDescriptor::new(name, ParamLocation::Path, ParamType::STRING));
            }
        }

        let (path_params, query_params): (Vec<_>, Vec<_>) = merged
            .into_iter()
            .partition(|p| p.location == ParamLocation::Path);

        let mut parameters: Vec<ParamDescriptor> = Vec::with_capacity(path_params.len() + query_params.len());
        for param in path_params.into_iter().chain(query_params) {
            if parameters.iter().any(|p| p.name == param.name) {
                warn!(
                    "Duplicate parameter name '{}' on {}; keeping the first declaration",
                    param.name, path
                );
                continue;
            }
            parameters.push(param);
        }

        Ok(parameters)
    }

    /// Inline one parameter node. `Ok(None)` for header/cookie parameters.
    ///
    /// Nodes the OpenAPI 3.0 model accepts are read through it; anything
    /// else (3.1 type lists, unknown keywords) is read shallowly from the
    /// raw node. Only a node without `name`/`in` is malformed.
    fn inline(&self, param: &Value) -> Result<Option<ParamDescriptor>> {
        let node = match param.get("$ref").and_then(Value::as_str) {
            Some(reference) => self
                .doc
                .resolve_ref(reference)
                .ok_or_else(|| anyhow!("unresolvable parameter reference {}", reference))?,
            None => param,
        };

        match serde_json::from_value::<Parameter>(node.clone()) {
            Ok(parameter) => {
                let (location, data) = match &parameter {
                    Parameter::Path { parameter_data, .. } => (ParamLocation::Path, parameter_data),
                    Parameter::Query { parameter_data, .. } => (ParamLocation::Query, parameter_data),
                    Parameter::Header { .. } | Parameter::Cookie { .. } => return Ok(None),
                };
                Ok(Some(self.describe(location, data)))
            }
            Err(e) => {
                debug!("Reading parameter shallowly ({})", e);
                self.describe_raw(node)
            }
        }
    }

    fn describe(&self, location: ParamLocation, data: &ParameterData) -> ParamDescriptor {
        let (param_type, allowed_values) = match &data.format {
            ParameterSchemaOrContent::Schema(ReferenceOr::Item(schema)) => top_level_type(schema),
            ParameterSchemaOrContent::Schema(ReferenceOr::Reference { reference }) => self
                .doc
                .resolve_ref(reference)
                .map(|node| self.raw_schema_type(node))
                // Opaque placeholder for anything we cannot read.
                .unwrap_or((ParamType::Object, Vec::new())),
            ParameterSchemaOrContent::Content(_) => (ParamType::Object, Vec::new()),
        };

        ParamDescriptor {
            name: data.name.clone(),
            location,
            required: data.required || location == ParamLocation::Path,
            param_type,
            description: data.description.clone().unwrap_or_default(),
            allowed_values,
        }
    }

    fn describe_raw(&self, node: &Value) -> Result<Option<ParamDescriptor>> {
        let name = node
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("parameter has no name"))?;
        let location = match node.get("in").and_then(Value::as_str) {
            Some("path") => ParamLocation::Path,
            Some("query") => ParamLocation::Query,
            Some("header") | Some("cookie") => return Ok(None),
            Some(other) => bail!("parameter '{}' has unknown location '{}'", name, other),
            None => bail!("parameter '{}' has no location", name),
        };

        let (param_type, allowed_values) = match node.get("schema") {
            Some(schema) => self.raw_schema_type(schema),
            None if node.get("content").is_some() => (ParamType::Object, Vec::new()),
            None => (ParamType::STRING, Vec::new()),
        };

        Ok(Some(ParamDescriptor {
            name: name.to_string(),
            location,
            required: location == ParamLocation::Path
                || node.get("required").and_then(Value::as_bool).unwrap_or(false),
            param_type,
            description: node
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            allowed_values,
        }))
    }

    /// Type tag and enum of a raw schema node, following one `$ref`.
    ///
    /// A `type` list takes its first non-null entry.
    fn raw_schema_type(&self, schema: &Value) -> (ParamType, Vec<Value>) {
        let schema = self.follow(schema);
        if schema.get("$ref").is_some() {
            return (ParamType::Object, Vec::new());
        }

        let type_name = match schema.get("type") {
            Some(Value::String(name)) => Some(name.as_str()),
            Some(Value::Array(names)) => names
                .iter()
                .filter_map(Value::as_str)
                .find(|name| *name != "null"),
            _ => None,
        };
        let param_type = match type_name {
            Some(name) => ParamType::from_type_name(name),
            None if ["oneOf", "anyOf", "allOf", "not", "properties"]
                .iter()
                .any(|key| schema.get(*key).is_some()) =>
            {
                ParamType::Object
            }
            None if schema.get("items").is_some() => ParamType::Array,
            None => ParamType::STRING,
        };

        let allowed_values = schema
            .get("enum")
            .and_then(Value::as_array)
            .map(|values| values.iter().filter(|v| !v.is_null()).cloned().collect())
            .unwrap_or_default();

        (param_type, allowed_values)
    }

    /// Shallow summary of the first JSON success (or default) response
    /// schema of a raw operation node.
    pub fn response_schema(&self, operation: &Value) -> Option<Value> {
        let responses = operation.get("responses")?.as_object()?;
        let response = responses
            .get("200")
            .or_else(|| {
                responses
                    .iter()
                    .find(|(status, _)| status.len() == 3 && status.starts_with('2'))
                    .map(|(_, r)| r)
            })
            .or_else(|| responses.get("default"))?;
        let response = self.follow(response);

        let content = response.get("content")?.as_object()?;
        let media = content
            .get("application/json")
            .or_else(|| {
                content
                    .iter()
                    .find(|(media_type, _)| media_type.contains("json"))
                    .map(|(_, m)| m)
            })?;
        let schema = media.get("schema")?;

        Some(self.shallow_schema(schema))
    }

    fn shallow_schema(&self, schema: &Value) -> Value {
        let schema = self.follow(schema);
        let mut summary = pick_shallow_keys(schema);

        if let Some(items) = schema.get("items") {
            let items_summary = match items.get("$ref").and_then(Value::as_str) {
                // Nested reference stays an opaque placeholder.
                Some(reference) => {
                    let mut placeholder = Map::new();
                    placeholder.insert("$ref".to_string(), Value::String(reference.to_string()));
                    placeholder
                }
                None => pick_shallow_keys(items),
            };
            summary.insert("items".to_string(), Value::Object(items_summary));
        }

        Value::Object(summary)
    }

    /// Follow a `$ref` one hop; returns the node itself otherwise.
    fn follow<'v>(&'v self, node: &'v Value) -> &'v Value {
        node.get("$ref")
            .and_then(Value::as_str)
            .and_then(|reference| self.doc.resolve_ref(reference))
            .unwrap_or(node)
    }
}

fn pick_shallow_keys(node: &Value) -> Map<String, Value> {
    SHALLOW_KEYS
        .iter()
        .filter_map(|key| node.get(*key).map(|v| (key.to_string(), v.clone())))
        .collect()
}

/// Type tag and declared enum values of a schema, without descending into it.
fn top_level_type(schema: &Schema) -> (ParamType, Vec<Value>) {
    match &schema.schema_kind {
        SchemaKind::Type(Type::String(string)) => (
            ParamType::Scalar(ScalarType::String),
            string.enumeration.iter().flatten().cloned().map(Value::from).collect(),
        ),
        SchemaKind::Type(Type::Integer(integer)) => (
            ParamType::Scalar(ScalarType::Integer),
            integer.enumeration.iter().flatten().copied().map(Value::from).collect(),
        ),
        SchemaKind::Type(Type::Number(number)) => (
            ParamType::Scalar(ScalarType::Number),
            number
                .enumeration
                .iter()
                .flatten()
                .filter_map(|n| serde_json::Number::from_f64(*n).map(Value::Number))
                .collect(),
        ),
        SchemaKind::Type(Type::Boolean(_)) => (ParamType::Scalar(ScalarType::Boolean), Vec::new()),
        SchemaKind::Type(Type::Array(_)) => (ParamType::Array, Vec::new()),
        SchemaKind::Type(Type::Object(_)) => (ParamType::Object, Vec::new()),
        SchemaKind::Any(any) => (
            any.typ
                .as_deref()
                .map(ParamType::from_type_name)
                .unwrap_or(ParamType::STRING),
            Vec::new(),
        ),
        // oneOf / anyOf / allOf / not
        _ => (ParamType::Object, Vec::new()),
    }
}

/// Placeholder names of a path template, in order of appearance.
pub fn path_placeholders(template: &str) -> Vec<String> {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^/}]+)\}").expect("valid placeholder regex"));

    re.captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}
