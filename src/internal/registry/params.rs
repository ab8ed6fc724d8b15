// src/internal/registry/params.rs

use super::registry::{EndpointRegistry, KNOWN_PATHS_LIMIT};
use crate::internal::error::ToolError;
use crate::internal::parser::types::{EndpointDescriptor, ParamDescriptor};

impl EndpointRegistry {
    /// Exact lookup of a registered template.
    pub fn lookup(&self, path: &str) -> Result<&EndpointDescriptor, ToolError> {
        self.get(path).ok_or_else(|| self.not_found(path))
    }

    /// Path parameters first, then query parameters, each in document order.
    pub fn get_available_params(&self, path: &str) -> Result<Vec<ParamDescriptor>, ToolError> {
        self.lookup(path).map(|endpoint| endpoint.parameters.clone())
    }

    pub(crate) fn not_found(&self, path: &str) -> ToolError {
        ToolError::NotFound {
            path: path.to_string(),
            suggested_template: self.suggest_template(path),
            known_paths: self.known_paths(KNOWN_PATHS_LIMIT),
        }
    }
}
