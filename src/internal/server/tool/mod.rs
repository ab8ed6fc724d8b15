pub mod handler;

pub use handler::{ToolExecutor, ToolHandler, CALL_GET, GET_AVAILABLE_PARAMS, SEARCH_ENDPOINTS};
