//! call_get validation and request construction against a stubbed upstream

use serde_json::{json, Map, Value};
use std::sync::Arc;

use specgate::internal::config::EndpointConfig;
use specgate::internal::error::ToolError;
use specgate::internal::parser::{ParamDescriptor, ParamType, ScalarType};
use specgate::internal::requester::{CallRequest, UpstreamError, UpstreamFailure};

mod fixtures;

use fixtures::upstream::{market_context, StubUpstream};

fn call(path: &str, params: Value) -> CallRequest {
    CallRequest {
        path: path.to_string(),
        params: params.as_object().cloned().unwrap_or_else(Map::new),
        headers: Default::default(),
    }
}

#[tokio::test]
async fn test_greeks_call_builds_path_and_query() {
    let upstream = Arc::new(StubUpstream::default());
    let context = market_context(Arc::clone(&upstream), EndpointConfig::default());

    let result = context
        .call_get(call(
            "/stock/{ticker}/greeks",
            json!({ "ticker": "AAPL", "expiry": "2024-01-19" }),
        ))
        .await
        .unwrap();

    assert_eq!(result.status_code, 200);
    assert_eq!(upstream.calls(), 1);
    let request = upstream.last_request().unwrap();
    assert_eq!(request.url.path(), "/stock/AAPL/greeks");
    assert_eq!(request.url.query(), Some("expiry=2024-01-19"));
}

#[tokio::test]
async fn test_no_query_string_without_query_params() {
    let upstream = Arc::new(StubUpstream::default());
    let context = market_context(Arc::clone(&upstream), EndpointConfig::default());

    context
        .call_get(call("/darkpool/{ticker}", json!({ "ticker": "SPY" })))
        .await
        .unwrap();

    let request = upstream.last_request().unwrap();
    assert_eq!(request.url.as_str(), "https://api.example.com/darkpool/SPY");
}

/// A value of the declared type, preferring the first allowed value.
fn sample_value(param: &ParamDescriptor) -> Value {
    if let Some(value) = param.allowed_values.first() {
        return value.clone();
    }
    match param.param_type {
        ParamType::Scalar(ScalarType::String) => json!("x"),
        ParamType::Scalar(ScalarType::Integer) => json!(1),
        ParamType::Scalar(ScalarType::Number) => json!(1.5),
        ParamType::Scalar(ScalarType::Boolean) => json!(true),
        ParamType::Array => json!(["x"]),
        ParamType::Object => json!({}),
    }
}

#[tokio::test]
async fn test_listed_params_are_exactly_the_accepted_set() {
    let upstream = Arc::new(StubUpstream::default());
    let context = market_context(Arc::clone(&upstream), EndpointConfig::default());
    let registry = Arc::clone(context.registry());

    for endpoint in registry.endpoints() {
        let listed = context.get_available_params(&endpoint.path).unwrap();
        let params: Map<String, Value> = listed
            .iter()
            .map(|p| (p.name.clone(), sample_value(p)))
            .collect();

        let result = context.call_get(call(&endpoint.path, Value::Object(params.clone()))).await;
        assert!(result.is_ok(), "{} rejected its own params: {:?}", endpoint.path, result);

        let mut with_extra = params;
        with_extra.insert("not_declared".to_string(), json!("x"));
        match context
            .call_get(call(&endpoint.path, Value::Object(with_extra)))
            .await
            .unwrap_err()
        {
            ToolError::UnknownParameter { name, allowed, .. } => {
                assert_eq!(name, "not_declared");
                let names: Vec<_> = listed.iter().map(|p| p.name.clone()).collect();
                assert_eq!(allowed, names);
            }
            other => panic!("{}: unexpected error: {other:?}", endpoint.path),
        }
    }
    assert_eq!(upstream.calls(), registry.len());
}

#[tokio::test]
async fn test_unknown_parameter_sends_nothing() {
    let upstream = Arc::new(StubUpstream::default());
    let context = market_context(Arc::clone(&upstream), EndpointConfig::default());

    let err = context
        .call_get(call(
            "/stock/{ticker}/greeks",
            json!({ "ticker": "AAPL", "strike": 100, "also_bad": 1 }),
        ))
        .await
        .unwrap_err();

    match err {
        ToolError::UnknownParameter { name, allowed, .. } => {
            assert_eq!(name, "strike");
            assert_eq!(allowed, vec!["ticker", "expiry"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_missing_required_parameters_listed() {
    let upstream = Arc::new(StubUpstream::default());
    let context = market_context(Arc::clone(&upstream), EndpointConfig::default());

    let err = context
        .call_get(call("/option-contract/{id}/historic", json!({})))
        .await
        .unwrap_err();

    match err {
        ToolError::MissingParameter { missing, .. } => assert_eq!(missing, vec!["id", "limit"]),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_unknown_path_not_found() {
    let upstream = Arc::new(StubUpstream::default());
    let context = market_context(Arc::clone(&upstream), EndpointConfig::default());

    let err = context
        .call_get(call("/options/chain", json!({})))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "not_found");
    let payload = err.to_payload();
    assert!(payload["error"]["known_paths"].as_array().unwrap().len() > 1);
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_type_mismatch_sends_nothing() {
    let upstream = Arc::new(StubUpstream::default());
    let context = market_context(Arc::clone(&upstream), EndpointConfig::default());

    let err = context
        .call_get(call(
            "/stock/{ticker}/flow-alerts",
            json!({ "ticker": "TSLA", "limit": "lots" }),
        ))
        .await
        .unwrap_err();

    match err {
        ToolError::TypeMismatch { name, expected, .. } => {
            assert_eq!(name, "limit");
            assert_eq!(expected, "integer");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_coerced_values_and_repeated_array_keys() {
    let upstream = Arc::new(StubUpstream::default());
    let context = market_context(Arc::clone(&upstream), EndpointConfig::default());

    context
        .call_get(call(
            "/stock/{ticker}/flow-alerts",
            json!({ "side": ["bid", "ask"], "is_call": "TRUE", "limit": 50.0, "ticker": "TSLA" }),
        ))
        .await
        .unwrap();

    let request = upstream.last_request().unwrap();
    assert_eq!(
        request.url.query(),
        Some("limit=50&is_call=true&side=bid&side=ask")
    );
}

#[tokio::test]
async fn test_concrete_path_is_resolved_to_template() {
    let upstream = Arc::new(StubUpstream::default());
    let context = market_context(Arc::clone(&upstream), EndpointConfig::default());

    context
        .call_get(call("/stock/NVDA/greeks", json!({ "expiry": "2024-03-15" })))
        .await
        .unwrap();

    let request = upstream.last_request().unwrap();
    assert_eq!(request.url.path(), "/stock/NVDA/greeks");
    assert_eq!(request.url.query(), Some("expiry=2024-03-15"));
}

#[tokio::test]
async fn test_path_values_are_percent_encoded() {
    let upstream = Arc::new(StubUpstream::default());
    let context = market_context(Arc::clone(&upstream), EndpointConfig::default());

    context
        .call_get(call("/darkpool/{ticker}", json!({ "ticker": "BRK/B" })))
        .await
        .unwrap();

    let request = upstream.last_request().unwrap();
    assert_eq!(request.url.path(), "/darkpool/BRK%2FB");
}

#[tokio::test]
async fn test_dot_segment_path_values_are_rejected() {
    let upstream = Arc::new(StubUpstream::default());
    let context = market_context(Arc::clone(&upstream), EndpointConfig::default());

    for request in [
        call("/stock/{ticker}/greeks", json!({ "ticker": ".." })),
        call("/stock/{ticker}/greeks", json!({ "ticker": "." })),
        call("/stock/../greeks", json!({})),
    ] {
        match context.call_get(request).await.unwrap_err() {
            ToolError::TypeMismatch { name, expected, .. } => {
                assert_eq!(name, "ticker");
                assert_eq!(expected, "path segment");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_dots_inside_a_value_stay_in_the_segment() {
    let upstream = Arc::new(StubUpstream::default());
    let context = market_context(Arc::clone(&upstream), EndpointConfig::default());

    context
        .call_get(call("/stock/{ticker}/greeks", json!({ "ticker": "BRK.B" })))
        .await
        .unwrap();

    let request = upstream.last_request().unwrap();
    assert_eq!(request.url.path(), "/stock/BRK.B/greeks");
}

#[tokio::test]
async fn test_upstream_error_status_is_passed_through() {
    let upstream = Arc::new(StubUpstream::returning(500, json!({ "error": "x" })));
    let context = market_context(Arc::clone(&upstream), EndpointConfig::default());

    let result = context
        .call_get(call("/internal/status", json!({})))
        .await
        .unwrap();

    assert_eq!(result.status_code, 500);
    assert_eq!(result.body, json!({ "error": "x" }));
}

#[tokio::test]
async fn test_upstream_failure_is_reported_with_kind() {
    let upstream = Arc::new(StubUpstream::failing(UpstreamError::new(
        UpstreamFailure::Timeout,
        "no response within 30s",
    )));
    let context = market_context(Arc::clone(&upstream), EndpointConfig::default());

    let err = context
        .call_get(call("/internal/status", json!({})))
        .await
        .unwrap_err();

    let payload = err.to_payload();
    assert_eq!(payload["error"]["kind"], "upstream");
    assert_eq!(payload["error"]["failure"], "timeout");
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_credentials_injected_and_not_overridable() {
    let upstream = Arc::new(StubUpstream::default());
    let context = market_context(
        Arc::clone(&upstream),
        EndpointConfig {
            api_key: Some("server-key".to_string()),
            bearer_token: Some("server-token".to_string()),
            ..Default::default()
        },
    );

    let mut request = call("/internal/status", json!({}));
    request
        .headers
        .insert("x-api-key".to_string(), "caller-key".to_string());
    request
        .headers
        .insert("AUTHORIZATION".to_string(), "Bearer caller".to_string());
    request
        .headers
        .insert("X-Client".to_string(), "tests".to_string());
    context.call_get(request).await.unwrap();

    let sent = upstream.last_request().unwrap();
    assert_eq!(sent.headers["x-api-key"], "server-key");
    assert_eq!(sent.headers["authorization"], "Bearer server-token");
    assert_eq!(sent.headers["x-client"], "tests");
}
