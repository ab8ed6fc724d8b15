//! Stub upstream that records requests instead of sending them

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use specgate::internal::config::{AppConfig, EndpointConfig};
use specgate::internal::parser::{Adjuster, SpecParser};
use specgate::internal::requester::{CallResult, OutgoingRequest, Upstream, UpstreamError};
use specgate::ServiceContext;

use super::openapi::MARKET_API_YAML;

pub const BASE_URL: &str = "https://api.example.com";

pub struct StubUpstream {
    calls: AtomicUsize,
    requests: Mutex<Vec<OutgoingRequest>>,
    response: Result<CallResult, UpstreamError>,
}

impl StubUpstream {
    pub fn returning(status_code: u16, body: Value) -> Self {
        Self::with_result(Ok(CallResult {
            status_code,
            body,
            headers: BTreeMap::from([(
                "content-type".to_string(),
                "application/json".to_string(),
            )]),
        }))
    }

    pub fn failing(error: UpstreamError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(response: Result<CallResult, UpstreamError>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            response,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<OutgoingRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for StubUpstream {
    fn default() -> Self {
        Self::returning(200, json!({ "data": [] }))
    }
}

#[async_trait]
impl Upstream for StubUpstream {
    async fn send(&self, request: OutgoingRequest) -> Result<CallResult, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.response.clone()
    }
}

pub fn test_config(endpoint: EndpointConfig) -> AppConfig {
    AppConfig {
        spec_file: "market.yaml".to_string(),
        endpoint: EndpointConfig {
            base_url: BASE_URL.to_string(),
            ..endpoint
        },
        ..Default::default()
    }
}

/// Service context over `MARKET_API_YAML` with the given upstream.
pub fn market_context(upstream: Arc<StubUpstream>, endpoint: EndpointConfig) -> ServiceContext {
    let registry = SpecParser::new(Adjuster::new())
        .parse_slice(MARKET_API_YAML.as_bytes())
        .expect("fixture parses");
    ServiceContext::with_upstream(&test_config(endpoint), Arc::new(registry), upstream)
        .expect("context builds")
}
