use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::internal::mcp::{
    protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpMethod, JSONRPC_VERSION},
    registry::ToolRegistry,
};
use rmcp::model::{CallToolRequestParam, ListToolsResult, ServerInfo};

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// Pure MCP message processor - no I/O, just transforms
pub struct McpProcessor {
    server_info: ServerInfo,
    tool_registry: Arc<ToolRegistry>,
}

impl McpProcessor {
    pub fn new(server_info: ServerInfo, tool_registry: Arc<ToolRegistry>) -> Self {
        Self {
            server_info,
            tool_registry,
        }
    }

    /// Process a raw JSON-RPC request and return a response
    pub async fn process_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let mcp_method = McpMethod::from(request.method.as_str());
        tracing::debug!("Processing request for method: {:?}", mcp_method);

        match mcp_method {
            McpMethod::Initialize => Self::success(request, &self.server_info),
            // No response for notifications
            McpMethod::Initialized => JsonRpcResponse {
                jsonrpc: JSONRPC_VERSION.to_string(),
                id: None,
                result: None,
                error: None,
            },
            McpMethod::ToolsList => {
                let tools = self.tool_registry.list_metadata();
                tracing::debug!("Listing {} tools", tools.len());
                Self::success(request, &ListToolsResult::with_all_items(tools))
            }
            McpMethod::ToolsCall => self.call_tool(request).await,
            McpMethod::Ping => Self::success(request, &serde_json::json!({})),
            McpMethod::Unknown(method) => Self::failure(
                request,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
                None,
            ),
        }
    }

    async fn call_tool(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let params: CallToolRequestParam =
            match serde_json::from_value(request.params.clone().unwrap_or_default()) {
                Ok(params) => params,
                Err(e) => {
                    return Self::failure(
                        request,
                        INVALID_PARAMS,
                        format!("Invalid params: {}", e),
                        None,
                    )
                }
            };

        let Some(tool) = self.tool_registry.get(&params.name) else {
            return Self::failure(
                request,
                METHOD_NOT_FOUND,
                format!("Tool not found: {}", params.name),
                None,
            );
        };

        tracing::info!("Calling tool {}", params.name);
        match (tool.executor)(params.arguments.unwrap_or_default()).await {
            Ok(result) => Self::success(request, &result),
            Err(e) => Self::failure(request, e.code.0, e.message.into_owned(), e.data),
        }
    }

    fn success<T: Serialize>(request: &JsonRpcRequest, result: &T) -> JsonRpcResponse {
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse {
                jsonrpc: JSONRPC_VERSION.to_string(),
                id: request.id.clone(),
                result: Some(value),
                error: None,
            },
            Err(e) => Self::failure(
                request,
                INTERNAL_ERROR,
                format!("Failed to encode result: {}", e),
                None,
            ),
        }
    }

    fn failure(
        request: &JsonRpcRequest,
        code: i32,
        message: String,
        data: Option<Value>,
    ) -> JsonRpcResponse {
        JsonRpcResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: request.id.clone(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data,
            }),
        }
    }

    /// Parse raw bytes into a request (handles line-delimited JSON)
    pub fn parse_request(input: &[u8]) -> Result<JsonRpcRequest, serde_json::Error> {
        serde_json::from_slice(input)
    }

    /// Serialize response to bytes
    pub fn serialize_response(response: &JsonRpcResponse) -> Vec<u8> {
        serde_json::to_vec(response).unwrap_or_default()
    }
}
