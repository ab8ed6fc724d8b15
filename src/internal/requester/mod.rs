pub mod http_requester;
pub mod types;

// Re-export main types
pub use http_requester::HttpClientPool;
pub use types::{CallRequest, CallResult, OutgoingRequest, Upstream, UpstreamError, UpstreamFailure};
