// src/internal/server/tool/handler.rs

use rmcp::model::{CallToolResult, JsonObject, Tool};
use rmcp::ErrorData as McpError;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

use crate::internal::context::ServiceContext;
use crate::internal::error::ToolError;
use crate::internal::mcp::registry::{RegisteredTool, ToolRegistry};
use crate::internal::requester::CallRequest;

pub type ToolExecutor = Arc<
    dyn Fn(JsonObject) -> Pin<Box<dyn Future<Output = Result<CallToolResult, McpError>> + Send>>
        + Send
        + Sync,
>;

pub const SEARCH_ENDPOINTS: &str = "search_endpoints";
pub const GET_AVAILABLE_PARAMS: &str = "get_available_params";
pub const CALL_GET: &str = "call_get";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchEndpointsArgs {
    /// Keywords matched against endpoint paths, summaries and tags. Leave
    /// empty to list endpoints in document order.
    #[serde(default)]
    pub query: String,
    /// Maximum number of results (default 20).
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetAvailableParamsArgs {
    /// Endpoint path template exactly as returned by search_endpoints,
    /// e.g. `/stock/{ticker}/greeks`.
    pub path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CallGetArgs {
    /// Path template, or a concrete path such as `/stock/AAPL/greeks`.
    pub path: String,
    /// Path and query parameter values keyed by parameter name.
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Extra request headers. `X-API-Key` and `Authorization` are ignored.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl From<CallGetArgs> for CallRequest {
    fn from(args: CallGetArgs) -> Self {
        CallRequest {
            path: args.path,
            params: args.params,
            headers: args.headers,
        }
    }
}

/// ToolHandler builds the three registry tools on top of a ServiceContext.
pub struct ToolHandler {
    context: Arc<ServiceContext>,
}

impl ToolHandler {
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }

    /// Register every tool into the shared registry.
    pub fn register_tools(&self, registry: &ToolRegistry) {
        registry.register(SEARCH_ENDPOINTS.to_string(), self.search_endpoints_tool());
        registry.register(GET_AVAILABLE_PARAMS.to_string(), self.get_available_params_tool());
        registry.register(CALL_GET.to_string(), self.call_get_tool());
    }

    fn search_endpoints_tool(&self) -> RegisteredTool {
        let context = Arc::clone(&self.context);
        let executor: ToolExecutor = Arc::new(move |arguments| {
            let context = Arc::clone(&context);
            Box::pin(async move {
                let args: SearchEndpointsArgs = parse_arguments(SEARCH_ENDPOINTS, arguments)?;
                let endpoints = context.search_endpoints(&args.query, args.limit);
                debug!("search_endpoints '{}' -> {} hits", args.query, endpoints.len());
                structured(json!({ "endpoints": endpoints }))
            })
        });

        RegisteredTool {
            metadata: Tool::new(
                SEARCH_ENDPOINTS,
                "Search the available GET endpoints of the upstream API by keyword. \
                 Returns path, method and summary for each match, best matches first.",
                input_schema::<SearchEndpointsArgs>(),
            ),
            executor,
        }
    }

    fn get_available_params_tool(&self) -> RegisteredTool {
        let context = Arc::clone(&self.context);
        let executor: ToolExecutor = Arc::new(move |arguments| {
            let context = Arc::clone(&context);
            Box::pin(async move {
                let args: GetAvailableParamsArgs =
                    parse_arguments(GET_AVAILABLE_PARAMS, arguments)?;
                match context.get_available_params(&args.path) {
                    Ok(parameters) => {
                        let response_schema = context
                            .registry()
                            .get(&args.path)
                            .and_then(|e| e.response_schema.clone());
                        let mut body = json!({ "path": args.path, "parameters": parameters });
                        if let (Some(schema), Some(obj)) = (response_schema, body.as_object_mut()) {
                            obj.insert("responseSchema".to_string(), schema);
                        }
                        structured(body)
                    }
                    Err(e) => Ok(tool_error(&e)),
                }
            })
        });

        RegisteredTool {
            metadata: Tool::new(
                GET_AVAILABLE_PARAMS,
                "List the path and query parameters accepted by an endpoint: name, \
                 location, whether it is required, its type and description.",
                input_schema::<GetAvailableParamsArgs>(),
            ),
            executor,
        }
    }

    fn call_get_tool(&self) -> RegisteredTool {
        let context = Arc::clone(&self.context);
        let executor: ToolExecutor = Arc::new(move |arguments| {
            let context = Arc::clone(&context);
            Box::pin(async move {
                let args: CallGetArgs = parse_arguments(CALL_GET, arguments)?;
                match context.call_get(args.into()).await {
                    Ok(result) => {
                        let value = serde_json::to_value(&result).map_err(|e| {
                            McpError::internal_error(format!("failed to encode result: {}", e), None)
                        })?;
                        structured(value)
                    }
                    Err(e) => Ok(tool_error(&e)),
                }
            })
        });

        RegisteredTool {
            metadata: Tool::new(
                CALL_GET,
                "Call a GET endpoint of the upstream API. Parameters are validated \
                 against the endpoint before any request is sent; the upstream status, \
                 body and headers are returned as-is. Credentials are added by the \
                 server: X-API-Key and Authorization headers supplied here are dropped.",
                input_schema::<CallGetArgs>(),
            ),
            executor,
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: JsonObject) -> Result<T, McpError> {
    serde_json::from_value(Value::Object(arguments)).map_err(|e| {
        McpError::invalid_params(format!("invalid arguments for {}: {}", tool, e), None)
    })
}

fn structured(value: Value) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::structured(value))
}

/// Domain failures are tool results, not protocol errors.
pub fn tool_error(error: &ToolError) -> CallToolResult {
    debug!("Tool error ({}): {}", error.kind(), error);
    CallToolResult::structured_error(error.to_payload())
}

pub fn input_schema<T: JsonSchema>() -> Arc<JsonObject> {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(schema) {
        Ok(Value::Object(object)) => Arc::new(object),
        _ => Arc::new(JsonObject::new()),
    }
}
