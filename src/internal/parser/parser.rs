// src/internal/parser/parser.rs

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use super::adjuster::Adjuster;
use super::loader::ApiDocument;
use super::resolver::ParamResolver;
use super::types::{EndpointDescriptor, GET};
use crate::internal::error::SpecLoadError;
use crate::internal::registry::EndpointRegistry;

/// SpecParser turns an API description into the endpoint registry.
///
/// Only GET operations are registered. Operations are read from the raw
/// document, so optional sections (`responses`, `tags`) may be absent. A
/// malformed operation is logged and skipped; only document-level problems
/// are fatal.
pub struct SpecParser {
    adjuster: Adjuster,
}

impl SpecParser {
    pub fn new(adjuster: Adjuster) -> Self {
        Self { adjuster }
    }

    pub fn parse_file(&self, spec_file: impl AsRef<Path>) -> Result<EndpointRegistry, SpecLoadError> {
        let spec_file = spec_file.as_ref();
        info!("Loading API description from {}", spec_file.display());
        let doc = ApiDocument::from_file(spec_file)?;
        Ok(self.build_registry(&doc))
    }

    pub fn parse_slice(&self, data: &[u8]) -> Result<EndpointRegistry, SpecLoadError> {
        let doc = ApiDocument::from_slice(data)?;
        Ok(self.build_registry(&doc))
    }

    pub fn build_registry(&self, doc: &ApiDocument) -> EndpointRegistry {
        let endpoints = self.process_operations(doc);
        EndpointRegistry::new(endpoints).with_hidden_tags(self.adjuster.hidden_tags().iter().cloned())
    }

    fn process_operations(&self, doc: &ApiDocument) -> Vec<EndpointDescriptor> {
        info!(
            "Processing {} paths from {}",
            doc.paths().len(),
            doc.title().unwrap_or("untitled API description")
        );
        if self.adjuster.get_routes_count() > 0 {
            info!(
                "Adjuster restricts registration to {} routes",
                self.adjuster.get_routes_count()
            );
        }

        let resolver = ParamResolver::new(doc);
        let mut endpoints = Vec::new();
        let mut skipped = 0usize;

        for (path, path_item) in doc.paths() {
            let Some(operation) = path_item.get("get") else {
                debug!("No GET operation on {}", path);
                continue;
            };
            if path_item.get("$ref").is_some() {
                warn!("Skipping {}: referenced path items are not supported", path);
                skipped += 1;
                continue;
            }
            if !self.adjuster.is_selected(path) {
                debug!("Skipped GET {} (filtered by adjuster)", path);
                continue;
            }

            match self.describe_operation(&resolver, path, path_item, operation) {
                Ok(endpoint) => {
                    debug!(
                        "Registered GET {} with {} parameters",
                        path,
                        endpoint.parameters.len()
                    );
                    endpoints.push(endpoint);
                }
                Err(e) => {
                    warn!("Skipping malformed GET {}: {:#}", path, e);
                    skipped += 1;
                }
            }
        }

        info!(
            "Registered {} GET endpoints ({} skipped as malformed)",
            endpoints.len(),
            skipped
        );
        endpoints
    }

    fn describe_operation(
        &self,
        resolver: &ParamResolver<'_>,
        path: &str,
        path_item: &Value,
        raw_operation: &Value,
    ) -> Result<EndpointDescriptor> {
        let operation = raw_operation
            .as_object()
            .ok_or_else(|| anyhow!("operation is not a mapping"))?;

        let path_level = parameter_list(path_item.get("parameters"))
            .context("path-level parameters")?;
        let operation_level = parameter_list(operation.get("parameters"))
            .context("operation parameters")?;
        let parameters = resolver.resolve(path, path_level, operation_level)?;

        let original_summary = operation
            .get("summary")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| operation.get("description").and_then(Value::as_str))
            .unwrap_or_default();

        let mut tags: Vec<String> = Vec::new();
        for tag in operation
            .get("tags")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
        {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }

        Ok(EndpointDescriptor {
            path: path.to_string(),
            method: GET.to_string(),
            summary: self.adjuster.summary(path, original_summary),
            tags,
            parameters,
            response_schema: resolver.response_schema(raw_operation),
        })
    }
}

/// A `parameters` node: absent means none, anything but a list is malformed.
fn parameter_list(node: Option<&Value>) -> Result<&[Value]> {
    match node {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => bail!("parameters is not a list"),
    }
}

impl Default for SpecParser {
    fn default() -> Self {
        Self::new(Adjuster::new())
    }
}
