//! Error types shared by the registry, the dispatcher and the tool layer.

use serde_json::{json, Value};
use thiserror::Error;

use crate::internal::requester::UpstreamError;

/// Fatal errors raised while loading the API description at startup.
#[derive(Debug, Error)]
pub enum SpecLoadError {
    #[error("failed to read API description {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("API description is neither valid JSON ({json}) nor valid YAML ({yaml})")]
    Parse { json: String, yaml: String },

    #[error("API description root must be a mapping")]
    NotAMapping,

    #[error("API description has no `paths` mapping")]
    MissingPaths,
}

/// Errors returned by the three tool operations.
///
/// Everything except `Upstream` is detected from the registry alone, before
/// any request is built.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ToolError {
    #[error("unknown GET path: {path}")]
    NotFound {
        path: String,
        suggested_template: Option<String>,
        known_paths: Vec<String>,
    },

    #[error("path parameter '{param}' is '{from_path}' in the path but '{from_params}' in params")]
    PathParameterMismatch {
        template: String,
        param: String,
        from_path: String,
        from_params: String,
    },

    #[error("unknown parameter '{name}' for {path}")]
    UnknownParameter {
        path: String,
        name: String,
        allowed: Vec<String>,
    },

    #[error("missing required parameters for {path}: {}", .missing.join(", "))]
    MissingParameter { path: String, missing: Vec<String> },

    #[error("parameter '{name}' expects {expected}, got {value}")]
    TypeMismatch {
        path: String,
        name: String,
        expected: &'static str,
        value: String,
    },

    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ToolError {
    /// Stable machine-readable discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::NotFound { .. } => "not_found",
            ToolError::PathParameterMismatch { .. } => "path_parameter_mismatch",
            ToolError::UnknownParameter { .. } => "unknown_parameter",
            ToolError::MissingParameter { .. } => "missing_parameter",
            ToolError::TypeMismatch { .. } => "type_mismatch",
            ToolError::InvalidHeader { .. } => "invalid_header",
            ToolError::Upstream(_) => "upstream",
        }
    }

    /// Structured payload returned to the tool caller.
    pub fn to_payload(&self) -> Value {
        let mut error = json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });

        let details = match self {
            ToolError::NotFound {
                suggested_template,
                known_paths,
                ..
            } => json!({
                "suggested_template": suggested_template,
                "known_paths": known_paths,
            }),
            ToolError::PathParameterMismatch {
                template,
                param,
                from_path,
                from_params,
            } => json!({
                "template": template,
                "param": param,
                "from_path": from_path,
                "from_params": from_params,
            }),
            ToolError::UnknownParameter {
                path,
                name,
                allowed,
            } => json!({ "path": path, "name": name, "allowed": allowed }),
            ToolError::MissingParameter { path, missing } => {
                json!({ "path": path, "missing": missing })
            }
            ToolError::TypeMismatch {
                path,
                name,
                expected,
                value,
            } => json!({
                "path": path,
                "name": name,
                "expected": expected,
                "value": value,
            }),
            ToolError::InvalidHeader { name, reason } => json!({ "name": name, "reason": reason }),
            ToolError::Upstream(e) => json!({ "failure": e.kind }),
        };

        if let (Some(error), Value::Object(details)) = (error.as_object_mut(), details) {
            error.extend(details);
        }

        json!({ "error": error })
    }
}
