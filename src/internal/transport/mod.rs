use async_trait::async_trait;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod runner;
pub mod stdio;

pub use runner::TransportRunner;
pub use stdio::StdioTransport;

/// Framed message channel carrying JSON-RPC between a client and the server
#[async_trait]
pub trait Transport: Send + Sync {
    /// Read the next complete frame.
    async fn read_message(&mut self) -> Result<Vec<u8>, TransportError>;

    async fn write_message(&mut self, data: &[u8]) -> Result<(), TransportError>;

    async fn flush(&mut self) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Connection closed")]
    Closed,
}
