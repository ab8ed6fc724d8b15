pub mod http;

pub use http::Handler;
