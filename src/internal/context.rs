// src/internal/context.rs

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::internal::auth::AuthInjector;
use crate::internal::config::AppConfig;
use crate::internal::dispatcher::Dispatcher;
use crate::internal::error::ToolError;
use crate::internal::parser::{Adjuster, EndpointSummary, ParamDescriptor, SpecParser};
use crate::internal::registry::EndpointRegistry;
use crate::internal::requester::{CallRequest, CallResult, HttpClientPool, Upstream};

/// Handle to everything a tool call needs: the read-only registry and the
/// dispatcher with its shared HTTP client.
///
/// Built once at startup and shared behind an `Arc`.
pub struct ServiceContext {
    registry: Arc<EndpointRegistry>,
    dispatcher: Dispatcher,
}

impl ServiceContext {
    pub fn new(registry: Arc<EndpointRegistry>, dispatcher: Dispatcher) -> Self {
        Self {
            registry,
            dispatcher,
        }
    }

    /// Load the API description and build the HTTP client from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut adjuster = Adjuster::new();
        if let Some(file) = config.adjustments_file.as_deref() {
            adjuster.load(file).context("Failed to load adjustments")?;
        }

        let registry = SpecParser::new(adjuster)
            .parse_file(&config.spec_file)
            .with_context(|| format!("Failed to load API description {}", config.spec_file))?;
        info!("Registry ready with {} GET endpoints", registry.len());

        let upstream = HttpClientPool::new(&config.endpoint)?;
        Self::with_upstream(config, Arc::new(registry), Arc::new(upstream))
    }

    /// Build a context around an already loaded registry and any upstream.
    pub fn with_upstream(
        config: &AppConfig,
        registry: Arc<EndpointRegistry>,
        upstream: Arc<dyn Upstream>,
    ) -> Result<Self> {
        let auth = AuthInjector::from_config(&config.endpoint)?;
        let dispatcher = Dispatcher::new(
            Arc::clone(&registry),
            upstream,
            auth,
            &config.endpoint.base_url,
        );
        Ok(Self::new(registry, dispatcher))
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    pub fn search_endpoints(&self, query: &str, limit: Option<usize>) -> Vec<EndpointSummary> {
        self.registry.search_endpoints(query, limit)
    }

    pub fn get_available_params(&self, path: &str) -> Result<Vec<ParamDescriptor>, ToolError> {
        self.registry.get_available_params(path)
    }

    pub async fn call_get(&self, request: CallRequest) -> Result<CallResult, ToolError> {
        self.dispatcher.call_get(request).await
    }

    pub fn close(&self) {
        self.dispatcher.close();
    }
}
