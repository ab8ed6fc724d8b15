use serde::{Serialize, Serializer};
use serde_json::Value;

/// HTTP method of every registered endpoint.
pub const GET: &str = "GET";

/// Where a parameter is carried on the outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
}

/// Scalar parameter types the dispatcher knows how to coerce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Integer,
    Number,
    Boolean,
}

/// Shallow type tag of a parameter.
///
/// Composite schemas are never expanded; they surface as `array` or
/// `object` and their values are passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Scalar(ScalarType),
    Array,
    Object,
}

impl ParamType {
    pub const STRING: ParamType = ParamType::Scalar(ScalarType::String);

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Scalar(ScalarType::String) => "string",
            ParamType::Scalar(ScalarType::Integer) => "integer",
            ParamType::Scalar(ScalarType::Number) => "number",
            ParamType::Scalar(ScalarType::Boolean) => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }

    /// Map an OpenAPI `type` keyword; unknown names are opaque.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "string" => ParamType::Scalar(ScalarType::String),
            "integer" => ParamType::Scalar(ScalarType::Integer),
            "number" => ParamType::Scalar(ScalarType::Number),
            "boolean" => ParamType::Scalar(ScalarType::Boolean),
            "array" => ParamType::Array,
            _ => ParamType::Object,
        }
    }
}

impl Serialize for ParamType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One path or query parameter of a registered endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDescriptor {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub description: String,
    /// Allowed values declared by the schema; informational only.
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<Value>,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, location: ParamLocation, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            location,
            required: location == ParamLocation::Path,
            param_type,
            description: String::new(),
            allowed_values: Vec::new(),
        }
    }
}

/// Registered GET operation
#[derive(Debug, Clone, Serialize)]
pub struct EndpointDescriptor {
    pub path: String,
    pub method: String,
    pub summary: String,
    pub tags: Vec<String>,
    /// Path parameters first, then query parameters, each in document order.
    pub parameters: Vec<ParamDescriptor>,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

impl EndpointDescriptor {
    pub fn param(&self, name: &str) -> Option<&ParamDescriptor> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn param_names(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.name.clone()).collect()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Search hit returned by `search_endpoints`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointSummary {
    pub path: String,
    pub method: String,
    pub summary: String,
}

impl From<&EndpointDescriptor> for EndpointSummary {
    fn from(endpoint: &EndpointDescriptor) -> Self {
        Self {
            path: endpoint.path.clone(),
            method: endpoint.method.clone(),
            summary: endpoint.summary.clone(),
        }
    }
}
