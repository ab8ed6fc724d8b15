pub mod processor;
pub mod protocol;
pub mod registry;

pub use processor::McpProcessor;
pub use registry::{RegisteredTool, ToolRegistry};
