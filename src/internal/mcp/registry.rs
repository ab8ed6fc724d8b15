use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::internal::server::tool::handler::ToolExecutor;
use rmcp::model::Tool;

pub struct RegisteredTool {
    pub metadata: Tool,
    pub executor: ToolExecutor,
}

/// Thread-safe tool registry that can be shared across transports.
///
/// Tools are listed in name order.
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, Arc<RegisteredTool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn register(&self, name: String, tool: RegisteredTool) {
        self.write().insert(name, Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<RegisteredTool>> {
        self.read().get(name).cloned()
    }

    pub fn list_metadata(&self) -> Vec<Tool> {
        self.read()
            .values()
            .map(|tool| tool.metadata.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    // A panicking writer cannot leave the map half-updated, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Arc<RegisteredTool>>> {
        self.tools.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Arc<RegisteredTool>>> {
        self.tools.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
