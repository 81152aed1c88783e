//! Course outline lookup against the catalog.

use crate::db::Database;
use crate::tools::registry::Tool;
use crate::tools::types::{PropertySchema, Source, ToolDefinition, ToolError, ToolInputSchema};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub struct CourseOutlineTool {
    db: Arc<Database>,
    definition: ToolDefinition,
    sources: RwLock<Vec<Source>>,
}

#[derive(Debug, Deserialize)]
struct OutlineParams {
    course_name: String,
}

impl CourseOutlineTool {
    pub fn new(db: Arc<Database>) -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            "course_name".to_string(),
            PropertySchema::string("Course title (partial matches work, e.g. 'MCP', 'Introduction')"),
        );

        let definition = ToolDefinition {
            name: "get_course_outline".to_string(),
            description: "Get the complete outline of a course including title, course link, and all lessons".to_string(),
            input_schema: ToolInputSchema::object(properties, vec!["course_name".to_string()]),
        };

        Self {
            db,
            definition,
            sources: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Tool for CourseOutlineTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, parameters: Value) -> Result<String, ToolError> {
        let params: OutlineParams = serde_json::from_value(parameters)
            .map_err(|e| ToolError::new(format!("Invalid parameters: {}", e)))?;

        let course = match self.db.get_course_by_name(&params.course_name) {
            Ok(Some(course)) => course,
            Ok(None) => {
                return Ok(format!("No course found matching '{}'", params.course_name))
            }
            Err(e) => return Ok(format!("Outline error: {}", e)),
        };

        let mut lines = vec![
            format!("**{}**", course.title),
            format!(
                "Instructor: {}",
                course.instructor.as_deref().unwrap_or("Unknown Instructor")
            ),
            format!(
                "Course Link: {}",
                course.course_link.as_deref().unwrap_or("No link available")
            ),
            String::new(),
            "**Course Lessons:**".to_string(),
        ];

        if course.lessons.is_empty() {
            lines.push("No lessons available".to_string());
        } else {
            for lesson in &course.lessons {
                lines.push(format!("{}. {}", lesson.lesson_number, lesson.title));
            }
        }

        *self.sources.write() = vec![Source {
            text: course.title.clone(),
            link: course.course_link.clone(),
        }];

        Ok(lines.join("\n"))
    }

    fn last_sources(&self) -> Vec<Source> {
        self.sources.read().clone()
    }

    fn reset_sources(&self) {
        self.sources.write().clear();
    }
}
