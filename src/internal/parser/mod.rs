// src/internal/parser/mod.rs

pub mod adjuster;
pub mod loader;
pub mod parser;
pub mod resolver;
pub mod types;

pub use adjuster::Adjuster;
pub use loader::ApiDocument;
pub use parser::SpecParser;
pub use resolver::ParamResolver;
pub use types::{
    EndpointDescriptor, EndpointSummary, ParamDescriptor, ParamLocation, ParamType, ScalarType,
};
