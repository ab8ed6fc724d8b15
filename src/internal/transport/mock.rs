use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::internal::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};

use super::{Transport, TransportError};

/// In-memory transport: queued frames are read in order, written frames
/// are captured. Reading past the last frame reports `Closed`.
#[derive(Clone, Default)]
pub struct MockTransport {
    pub inputs: Arc<Mutex<VecDeque<Vec<u8>>>>,
    pub outputs: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_input(&self, data: Vec<u8>) {
        self.inputs.lock().unwrap().push_back(data);
    }

    pub fn queue_request(&self, request: &JsonRpcRequest) {
        let json = serde_json::to_vec(request).unwrap();
        self.queue_input(json);
    }

    pub fn get_outputs(&self) -> Vec<Vec<u8>> {
        self.outputs.lock().unwrap().clone()
    }

    /// Captured outputs parsed as responses
    pub fn get_responses(&self) -> Vec<JsonRpcResponse> {
        self.get_outputs()
            .iter()
            .filter_map(|data| serde_json::from_slice(data).ok())
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn read_message(&mut self) -> Result<Vec<u8>, TransportError> {
        self.inputs
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(TransportError::Closed)
    }

    async fn write_message(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.outputs.lock().unwrap().push(data.to_vec());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.inputs.lock().unwrap().is_empty()
    }
}
