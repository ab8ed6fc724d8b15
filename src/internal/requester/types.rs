// src/internal/requester/types.rs

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Arguments of a `call_get` invocation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallRequest {
    pub path: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// A validated request, ready to be sent upstream
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub url: Url,
    /// Auth headers plus caller headers; static config headers are applied
    /// by the client itself.
    pub headers: HeaderMap,
}

/// Upstream response, passed through whatever the status code
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallResult {
    pub status_code: u16,
    /// Parsed JSON for JSON content types, otherwise the body as text.
    pub body: Value,
    pub headers: BTreeMap<String, String>,
}

impl CallResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamFailure {
    Timeout,
    Connect,
    Request,
    Body,
    Closed,
}

impl UpstreamFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamFailure::Timeout => "timeout",
            UpstreamFailure::Connect => "connect",
            UpstreamFailure::Request => "request",
            UpstreamFailure::Body => "body",
            UpstreamFailure::Closed => "closed",
        }
    }
}

/// The upstream call failed before a response could be returned.
#[derive(Debug, Clone, Error)]
#[error("upstream {} failure: {message}", .kind.as_str())]
pub struct UpstreamError {
    pub kind: UpstreamFailure,
    pub message: String,
}

impl UpstreamError {
    pub fn new(kind: UpstreamFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Something that can execute a GET against the upstream API.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn send(&self, request: OutgoingRequest) -> Result<CallResult, UpstreamError>;

    /// Stop accepting requests. Later sends fail with a `closed` error.
    fn close(&self) {}
}
