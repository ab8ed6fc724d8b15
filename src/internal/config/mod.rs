pub mod config;

pub use config::{
    get_version_info, AppConfig, EndpointConfig, LoggingConfig, ServerConfig, ServerMode, VERSION,
};
