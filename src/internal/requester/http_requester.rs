// src/internal/requester/http_requester.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::types::{CallResult, OutgoingRequest, Upstream, UpstreamError, UpstreamFailure};
use crate::internal::config::config::EndpointConfig;

/// HttpClientPool owns the single HTTP client used for every upstream call.
///
/// At most one connection is kept alive and at most one request is in
/// flight; concurrent callers queue on the permit. The timeout of a call
/// covers the wait for the permit, the send and the body read.
#[derive(Clone)]
pub struct HttpClientPool {
    client: Client,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl HttpClientPool {
    pub fn new(endpoint_cfg: &EndpointConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        for (key, value) in &endpoint_cfg.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .with_context(|| format!("Invalid header name in endpoint config: {}", key))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {} in endpoint config", key))?;
            default_headers.insert(name, value);
        }

        let timeout = endpoint_cfg.timeout();
        let client = Client::builder()
            .default_headers(default_headers)
            .pool_max_idle_per_host(1)
            .connect_timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        info!(
            "HTTP client ready for {} (timeout {:?}, one connection)",
            endpoint_cfg.base_url, timeout
        );

        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(1)),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    async fn execute(&self, request: OutgoingRequest) -> Result<CallResult, UpstreamError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| UpstreamError::new(UpstreamFailure::Closed, "HTTP client pool is closed"))?;

        let response = self
            .client
            .get(request.url)
            .headers(request.headers)
            .send()
            .await
            .map_err(classify)?;

        Self::process_response(response).await
    }

    /// Turn the HTTP response into a CallResult; the status is never
    /// interpreted here.
    async fn process_response(response: reqwest::Response) -> Result<CallResult, UpstreamError> {
        let status_code = response.status().as_u16();

        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (key, value) in response.headers() {
            let Ok(value) = value.to_str() else {
                continue;
            };
            headers
                .entry(key.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().contains("json"))
            .unwrap_or(false);

        let bytes = response.bytes().await.map_err(|e| {
            UpstreamError::new(UpstreamFailure::Body, format!("failed to read response body: {}", e))
        })?;

        let body = if is_json {
            serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                debug!("JSON content type but body does not parse ({}); returning text", e);
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        } else {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        };

        Ok(CallResult {
            status_code,
            body,
            headers,
        })
    }
}

#[async_trait]
impl Upstream for HttpClientPool {
    async fn send(&self, request: OutgoingRequest) -> Result<CallResult, UpstreamError> {
        let url = request.url.clone();
        let started = Instant::now();
        info!("Executing request: GET {}", url);

        let result = match tokio::time::timeout(self.timeout, self.execute(request)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::new(
                UpstreamFailure::Timeout,
                format!("no response within {:?}", self.timeout),
            )),
        };

        match &result {
            Ok(res) if res.is_success() => info!(
                "GET {} -> {} in {:?}",
                url,
                res.status_code,
                started.elapsed()
            ),
            Ok(res) => warn!(
                "GET {} -> {} in {:?} (passed through)",
                url,
                res.status_code,
                started.elapsed()
            ),
            Err(e) => warn!("GET {} failed after {:?}: {}", url, started.elapsed(), e),
        }
        result
    }

    fn close(&self) {
        if !self.permits.is_closed() {
            info!("Closing HTTP client pool");
            self.permits.close();
        }
    }
}

fn classify(err: reqwest::Error) -> UpstreamError {
    let kind = if err.is_timeout() {
        UpstreamFailure::Timeout
    } else if err.is_connect() {
        UpstreamFailure::Connect
    } else if err.is_body() || err.is_decode() {
        UpstreamFailure::Body
    } else {
        UpstreamFailure::Request
    };
    UpstreamError::new(kind, err.to_string())
}
