use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::internal::{
    mcp::{
        processor::{McpProcessor, PARSE_ERROR},
        protocol::{JsonRpcError, JsonRpcResponse, JSONRPC_VERSION},
    },
    transport::{Transport, TransportError},
};

/// Drives a transport: read a frame, process it, write the response.
pub struct TransportRunner<T: Transport> {
    transport: T,
    processor: Arc<McpProcessor>,
}

impl<T: Transport> TransportRunner<T> {
    pub fn new(transport: T, processor: Arc<McpProcessor>) -> Self {
        Self {
            transport,
            processor,
        }
    }

    /// Run until the peer closes the transport.
    pub async fn run(&mut self) -> Result<(), TransportError> {
        debug!("Transport loop started");
        loop {
            let input = match self.transport.read_message().await {
                Ok(data) => data,
                Err(TransportError::Closed) => {
                    info!("Transport closed by peer");
                    break;
                }
                Err(e) => {
                    warn!("Transport error: {}", e);
                    return Err(e);
                }
            };

            let request = match McpProcessor::parse_request(&input) {
                Ok(req) => req,
                Err(e) => {
                    warn!("Dropping unparseable frame of {} bytes: {}", input.len(), e);
                    let error_response = JsonRpcResponse {
                        jsonrpc: JSONRPC_VERSION.to_string(),
                        id: None, // Parse errors carry no id
                        result: None,
                        error: Some(JsonRpcError {
                            code: PARSE_ERROR,
                            message: format!("Parse error: {}", e),
                            data: None,
                        }),
                    };
                    self.send(&error_response).await?;
                    continue;
                }
            };

            let response = self.processor.process_request(&request).await;

            if request.is_notification() {
                debug!("Notification {} handled without response", request.method);
            } else {
                self.send(&response).await?;
            }
        }

        Ok(())
    }

    async fn send(&mut self, response: &JsonRpcResponse) -> Result<(), TransportError> {
        let output = McpProcessor::serialize_response(response);
        self.transport.write_message(&output).await?;
        self.transport.flush().await
    }
}
