pub mod cli;
pub mod internal;

// Re-export commonly used types
pub use internal::config::config;
pub use internal::context::ServiceContext;
pub use internal::error::{SpecLoadError, ToolError};
pub use internal::server::server;
