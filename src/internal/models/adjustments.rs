use serde::{Deserialize, Serialize};

/// Summary override for one registered path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDescription {
    pub path: String,
    #[serde(rename = "new_summary")]
    pub new_summary: String,
}

/// Optional tuning of the registry, loaded from a YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpAdjustments {
    /// Summary overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<RouteDescription>,

    /// Allow-list of paths to register; empty means every GET path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<String>,

    /// Endpoints carrying any of these tags are left out of search results
    /// but stay callable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_tags: Vec<String>,
}
