pub mod auth;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod logger;
pub mod mcp;
pub mod models;
pub mod parser;
pub mod registry;
pub mod requester;
pub mod server;
pub mod transport;
