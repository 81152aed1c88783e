use crate::ai::types::ClaudeTool;
use crate::tools::types::{Source, ToolDefinition, ToolError};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A callable tool the model can invoke during generation.
///
/// Tools that surface provenance override the source accessors; the
/// defaults cover tools with nothing to report.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn execute(&self, parameters: Value) -> Result<String, ToolError>;

    fn last_sources(&self) -> Vec<Source> {
        Vec::new()
    }

    fn reset_sources(&self) {}
}

#[derive(Default)]
struct ToolTable {
    by_name: HashMap<String, Arc<dyn Tool>>,
    // Registration order drives definition lists and source lookup.
    order: Vec<Arc<dyn Tool>>,
}

/// Holds registered tools and dispatches executions by name
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<ToolTable>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        log::debug!("[TOOLS] Registered tool: {}", name);
        let mut table = self.tools.write();
        table.by_name.insert(name, Arc::clone(&tool));
        table.order.push(tool);
    }

    pub fn get_tool_definitions(&self) -> Vec<ClaudeTool> {
        self.tools
            .read()
            .order
            .iter()
            .map(|tool| tool.definition().to_claude_tool())
            .collect()
    }

    /// Executes a registered tool. An unknown name is reported back to the
    /// model as ordinary result text rather than an error.
    pub async fn execute_tool(
        &self,
        tool_name: &str,
        parameters: Value,
    ) -> Result<String, ToolError> {
        // Clone the Arc inside a scope so the lock is released before awaiting
        let tool = {
            let table = self.tools.read();
            table.by_name.get(tool_name).cloned()
        };

        match tool {
            Some(tool) => tool.execute(parameters).await,
            None => Ok(format!("Tool '{}' not found", tool_name)),
        }
    }

    /// Sources from the first tool (in registration order) holding any.
    pub fn get_last_sources(&self) -> Vec<Source> {
        let table = self.tools.read();
        for tool in &table.order {
            let sources = tool.last_sources();
            if !sources.is_empty() {
                return sources;
            }
        }
        Vec::new()
    }

    pub fn reset_sources(&self) {
        let table = self.tools.read();
        for tool in &table.order {
            tool.reset_sources();
        }
    }
}
