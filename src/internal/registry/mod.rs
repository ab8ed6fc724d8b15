// src/internal/registry/mod.rs

pub mod params;
pub mod registry;
pub mod search;

pub use registry::{EndpointRegistry, TemplateMatch, KNOWN_PATHS_LIMIT};
pub use search::{tokenize, SearchIndex, DEFAULT_SEARCH_LIMIT};
