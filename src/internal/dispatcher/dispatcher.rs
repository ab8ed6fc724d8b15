// src/internal/dispatcher/dispatcher.rs

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use super::coerce::{render_query_values, render_scalar};
use crate::internal::auth::{is_reserved, AuthInjector};
use crate::internal::error::ToolError;
use crate::internal::parser::types::{EndpointDescriptor, ParamLocation};
use crate::internal::registry::EndpointRegistry;
use crate::internal::requester::{
    CallRequest, CallResult, OutgoingRequest, Upstream, UpstreamError, UpstreamFailure,
};

/// Validates `call_get` requests against the registry and forwards the
/// accepted ones upstream.
///
/// Every check runs before a request is built, so a rejected call never
/// reaches the network.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<EndpointRegistry>,
    upstream: Arc<dyn Upstream>,
    auth: AuthInjector,
    base_url: String,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<EndpointRegistry>,
        upstream: Arc<dyn Upstream>,
        auth: AuthInjector,
        base_url: &str,
    ) -> Self {
        Self {
            registry,
            upstream,
            auth,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn call_get(&self, request: CallRequest) -> Result<CallResult, ToolError> {
        let outgoing = self.prepare(&request)?;
        Ok(self.upstream.send(outgoing).await?)
    }

    pub fn close(&self) {
        self.upstream.close();
    }

    /// Validate a call and build the outgoing request.
    pub fn prepare(&self, request: &CallRequest) -> Result<OutgoingRequest, ToolError> {
        let (endpoint, params) = self.resolve(request)?;

        if let Some(name) = params.keys().find(|name| endpoint.param(name).is_none()) {
            return Err(ToolError::UnknownParameter {
                path: endpoint.path.clone(),
                name: name.clone(),
                allowed: endpoint.param_names(),
            });
        }

        let missing: Vec<String> = endpoint
            .parameters
            .iter()
            .filter(|p| p.required && is_absent(params.get(&p.name), p.location))
            .map(|p| p.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ToolError::MissingParameter {
                path: endpoint.path.clone(),
                missing,
            });
        }

        let mut path = endpoint.path.clone();
        let mut query: Vec<(String, String)> = Vec::new();
        for param in &endpoint.parameters {
            let Some(raw) = params.get(&param.name).filter(|v| !v.is_null()) else {
                continue;
            };
            let value = param
                .param_type
                .coerce(raw)
                .ok_or_else(|| ToolError::TypeMismatch {
                    path: endpoint.path.clone(),
                    name: param.name.clone(),
                    expected: param.param_type.as_str(),
                    value: raw.to_string(),
                })?;

            match param.location {
                ParamLocation::Path => {
                    let rendered = render_scalar(&value);
                    // URL parsing collapses dot segments, even percent-encoded ones.
                    if is_dot_segment(&rendered) {
                        return Err(ToolError::TypeMismatch {
                            path: endpoint.path.clone(),
                            name: param.name.clone(),
                            expected: "path segment",
                            value: raw.to_string(),
                        });
                    }
                    let placeholder = format!("{{{}}}", param.name);
                    let encoded = urlencoding::encode(&rendered).into_owned();
                    path = path.replace(&placeholder, &encoded);
                }
                ParamLocation::Query => {
                    query.extend(
                        render_query_values(&value)
                            .into_iter()
                            .map(|v| (param.name.clone(), v)),
                    );
                }
            }
        }

        let headers = self.build_headers(request)?;

        let mut url = Url::parse(&format!("{}{}", self.base_url, path)).map_err(|e| {
            UpstreamError::new(
                UpstreamFailure::Request,
                format!("cannot build request URL for {}: {}", endpoint.path, e),
            )
        })?;
        if !url.path().ends_with(&path) {
            return Err(UpstreamError::new(
                UpstreamFailure::Request,
                format!("request URL {} does not match template {}", url, endpoint.path),
            )
            .into());
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        debug!("Prepared GET {} for template {}", url, endpoint.path);
        Ok(OutgoingRequest { url, headers })
    }

    /// Find the endpoint for the requested path, inferring the template and
    /// path values when a concrete path is given.
    fn resolve(
        &self,
        request: &CallRequest,
    ) -> Result<(&EndpointDescriptor, Map<String, Value>), ToolError> {
        if let Some(endpoint) = self.registry.get(&request.path) {
            return Ok((endpoint, request.params.clone()));
        }

        let Some(matched) = self.registry.match_concrete(&request.path) else {
            return Err(self.registry.not_found(&request.path));
        };
        debug!(
            "Resolved concrete path {} to template {}",
            request.path, matched.endpoint.path
        );

        let mut params = request.params.clone();
        for (name, from_path) in matched.path_values {
            match params.get(&name).filter(|v| !v.is_null()) {
                Some(explicit) => {
                    let from_params = render_scalar(explicit);
                    if from_params != from_path {
                        return Err(ToolError::PathParameterMismatch {
                            template: matched.endpoint.path.clone(),
                            param: name,
                            from_path,
                            from_params,
                        });
                    }
                }
                None => {
                    params.insert(name, Value::String(from_path));
                }
            }
        }

        Ok((matched.endpoint, params))
    }

    fn build_headers(&self, request: &CallRequest) -> Result<reqwest::header::HeaderMap, ToolError> {
        let mut headers = self.auth.headers().clone();

        for (name, value) in &request.headers {
            if is_reserved(name) {
                warn!("Dropping caller-supplied reserved header {}", name);
                continue;
            }
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ToolError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| ToolError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

fn is_dot_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}

/// `null` is never a value; an empty path segment is not one either.
fn is_absent(value: Option<&Value>, location: ParamLocation) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => location == ParamLocation::Path && s.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::parser::types::{ParamDescriptor, ParamType, ScalarType, GET};
    use serde_json::json;

    struct Unreachable;

    #[async_trait::async_trait]
    impl Upstream for Unreachable {
        async fn send(&self, _request: OutgoingRequest) -> Result<CallResult, UpstreamError> {
            Err(UpstreamError::new(UpstreamFailure::Connect, "unreachable"))
        }
    }

    fn dispatcher(auth: AuthInjector) -> Dispatcher {
        let mut limit = ParamDescriptor::new(
            "limit",
            ParamLocation::Query,
            ParamType::Scalar(ScalarType::Integer),
        );
        limit.required = true;
        let registry = EndpointRegistry::new(vec![EndpointDescriptor {
            path: "/stock/{ticker}/flow".to_string(),
            method: GET.to_string(),
            summary: String::new(),
            tags: vec![],
            parameters: vec![
                ParamDescriptor::new("ticker", ParamLocation::Path, ParamType::STRING),
                limit,
                ParamDescriptor::new("side", ParamLocation::Query, ParamType::Array),
            ],
            response_schema: None,
        }]);
        Dispatcher::new(
            Arc::new(registry),
            Arc::new(Unreachable),
            auth,
            "https://api.example.com/v1/",
        )
    }

    fn request(path: &str, params: Value) -> CallRequest {
        CallRequest {
            path: path.to_string(),
            params: params.as_object().cloned().unwrap_or_default(),
            headers: Default::default(),
        }
    }

    #[test]
    fn test_builds_encoded_url() {
        let outgoing = dispatcher(AuthInjector::default())
            .prepare(&request(
                "/stock/{ticker}/flow",
                json!({"side": ["bid", "ask"], "ticker": "BRK B", "limit": "5"}),
            ))
            .unwrap();

        assert_eq!(
            outgoing.url.as_str(),
            "https://api.example.com/v1/stock/BRK%20B/flow?limit=5&side=bid&side=ask"
        );
    }

    #[test]
    fn test_empty_path_value_is_missing() {
        let err = dispatcher(AuthInjector::default())
            .prepare(&request("/stock/{ticker}/flow", json!({"ticker": "", "limit": null})))
            .unwrap_err();
        match err {
            ToolError::MissingParameter { missing, .. } => {
                assert_eq!(missing, vec!["ticker", "limit"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_type_mismatch() {
        let err = dispatcher(AuthInjector::default())
            .prepare(&request("/stock/{ticker}/flow", json!({"ticker": "A", "limit": "many"})))
            .unwrap_err();
        assert_eq!(err.kind(), "type_mismatch");
    }

    #[test]
    fn test_concrete_path_conflict() {
        let err = dispatcher(AuthInjector::default())
            .prepare(&request("/stock/AAPL/flow", json!({"ticker": "MSFT", "limit": 1})))
            .unwrap_err();
        assert_eq!(err.kind(), "path_parameter_mismatch");
    }

    #[test]
    fn test_reserved_headers_cannot_be_overridden() {
        let config = crate::internal::config::config::EndpointConfig {
            api_key: Some("server-key".to_string()),
            ..Default::default()
        };
        let dispatcher = dispatcher(AuthInjector::from_config(&config).unwrap());

        let mut call = request("/stock/AAPL/flow", json!({"limit": 1}));
        call.headers.insert("X-Api-Key".to_string(), "caller-key".to_string());
        call.headers.insert("Authorization".to_string(), "Bearer caller".to_string());
        call.headers.insert("X-Trace".to_string(), "abc".to_string());

        let outgoing = dispatcher.prepare(&call).unwrap();
        assert_eq!(outgoing.headers["x-api-key"], "server-key");
        assert!(outgoing.headers.get("authorization").is_none());
        assert_eq!(outgoing.headers["x-trace"], "abc");
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut call = request("/stock/AAPL/flow", json!({"limit": 1}));
        call.headers.insert("bad header".to_string(), "x".to_string());
        let err = dispatcher(AuthInjector::default()).prepare(&call).unwrap_err();
        assert_eq!(err.kind(), "invalid_header");
    }

    #[tokio::test]
    async fn test_upstream_failure_surfaces_as_tool_error() {
        let err = dispatcher(AuthInjector::default())
            .call_get(request("/stock/AAPL/flow", json!({"limit": 1})))
            .await
            .unwrap_err();
        match err {
            ToolError::Upstream(e) => assert_eq!(e.kind, UpstreamFailure::Connect),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
