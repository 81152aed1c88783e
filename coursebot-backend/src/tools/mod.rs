//! Tool registry and the builtin retrieval tools

pub mod builtin;
pub mod registry;
pub mod types;

pub use builtin::{CourseOutlineTool, CourseSearchTool};
pub use registry::{Tool, ToolRegistry};
pub use types::{PropertySchema, Source, ToolDefinition, ToolError, ToolInputSchema};

use crate::db::Database;
use std::sync::Arc;

/// Registry preloaded with the standard course tools.
pub fn create_default_registry(db: Arc<Database>, max_results: usize) -> ToolRegistry {
    let registry = ToolRegistry::new();
    registry.register(Arc::new(CourseSearchTool::new(Arc::clone(&db), max_results)));
    registry.register(Arc::new(CourseOutlineTool::new(db)));
    registry
}
