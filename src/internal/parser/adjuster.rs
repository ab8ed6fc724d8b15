use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::internal::models::adjustments::McpAdjustments;

/// Adjuster provides route filtering, summary overrides and search-hidden
/// tags based on YAML configuration
#[derive(Debug, Clone, Default)]
pub struct Adjuster {
    pub adjustments: McpAdjustments,
}

impl Adjuster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load adjustments from a YAML file. A missing file is not an error.
    pub fn load(&mut self, file_path: &str) -> Result<()> {
        if file_path.is_empty() {
            info!("No adjustments file provided");
            return Ok(());
        }

        if !Path::new(file_path).exists() {
            warn!("Adjustments file not found: {}", file_path);
            return Ok(());
        }

        let data = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read adjustments file: {}", file_path))?;

        self.load_str(&data)
            .with_context(|| format!("Failed to parse YAML from adjustments file: {}", file_path))
    }

    pub fn load_str(&mut self, data: &str) -> Result<()> {
        // An empty document deserializes to null
        let adjustments: Option<McpAdjustments> = serde_yaml::from_str(data)?;
        self.adjustments = adjustments.unwrap_or_default();
        debug!("Loaded adjustments: {:?}", self.adjustments);
        Ok(())
    }

    /// Whether a GET path should be registered
    pub fn is_selected(&self, path: &str) -> bool {
        if self.adjustments.routes.is_empty() {
            return true;
        }

        let normalized = path.trim_end_matches('/');
        self.adjustments
            .routes
            .iter()
            .any(|selected| selected.trim_end_matches('/') == normalized)
    }

    /// Get the summary for a path, applying an override if one exists
    pub fn summary(&self, path: &str, original: &str) -> String {
        self.adjustments
            .descriptions
            .iter()
            .find(|d| d.path == path)
            .map(|d| {
                debug!("Found summary override for {}", path);
                d.new_summary.clone()
            })
            .unwrap_or_else(|| original.to_string())
    }

    pub fn hidden_tags(&self) -> &[String] {
        &self.adjustments.hidden_tags
    }

    /// Get the number of route selections in the adjuster
    pub fn get_routes_count(&self) -> usize {
        self.adjustments.routes.len()
    }
}
