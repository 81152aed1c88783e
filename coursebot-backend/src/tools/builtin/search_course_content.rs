//! Course content search over the FTS index.

use crate::db::Database;
use crate::tools::registry::Tool;
use crate::tools::types::{PropertySchema, Source, ToolDefinition, ToolError, ToolInputSchema};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub struct CourseSearchTool {
    db: Arc<Database>,
    max_results: usize,
    definition: ToolDefinition,
    sources: RwLock<Vec<Source>>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default)]
    course_name: Option<String>,
    #[serde(default)]
    lesson_number: Option<i64>,
}

impl CourseSearchTool {
    pub fn new(db: Arc<Database>, max_results: usize) -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            "query".to_string(),
            PropertySchema::string("What to search for in the course content"),
        );
        properties.insert(
            "course_name".to_string(),
            PropertySchema::string("Course title (partial matches work, e.g. 'MCP', 'Introduction')"),
        );
        properties.insert(
            "lesson_number".to_string(),
            PropertySchema::integer("Specific lesson number to search within (e.g. 1, 2, 3)"),
        );

        let definition = ToolDefinition {
            name: "search_course_content".to_string(),
            description: "Search course materials with smart course name matching and lesson filtering".to_string(),
            input_schema: ToolInputSchema::object(properties, vec!["query".to_string()]),
        };

        Self {
            db,
            max_results,
            definition,
            sources: RwLock::new(Vec::new()),
        }
    }

    fn course_link_for(&self, course_title: &str) -> Option<String> {
        self.db
            .get_course_by_name(course_title)
            .ok()
            .flatten()
            .and_then(|course| course.course_link)
    }
}

#[async_trait]
impl Tool for CourseSearchTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, parameters: Value) -> Result<String, ToolError> {
        let params: SearchParams = serde_json::from_value(parameters)
            .map_err(|e| ToolError::new(format!("Invalid parameters: {}", e)))?;

        // Resolve the course name before searching so a bad name
        // short-circuits instead of silently matching nothing.
        let course_title = match &params.course_name {
            Some(name) => match self.db.resolve_course_name(name) {
                Ok(Some(title)) => Some(title),
                Ok(None) => return Ok(format!("No course found matching '{}'", name)),
                Err(e) => return Ok(format!("Search error: {}", e)),
            },
            None => None,
        };

        let hits = match self.db.search_chunks(
            &params.query,
            course_title.as_deref(),
            params.lesson_number,
            self.max_results,
        ) {
            Ok(hits) => hits,
            Err(e) => return Ok(format!("Search error: {}", e)),
        };

        if hits.is_empty() {
            let mut filter_info = String::new();
            if let Some(name) = &params.course_name {
                filter_info.push_str(&format!(" in course '{}'", name));
            }
            if let Some(n) = params.lesson_number {
                filter_info.push_str(&format!(" in lesson {}", n));
            }
            return Ok(format!("No relevant content found{}.", filter_info));
        }

        let mut formatted = Vec::new();
        let mut sources = Vec::new();
        for hit in &hits {
            let header = match hit.lesson_number {
                Some(n) => format!("[{} - Lesson {}]", hit.course_title, n),
                None => format!("[{}]", hit.course_title),
            };
            formatted.push(format!("{}\n{}", header, hit.content));

            let text = match hit.lesson_number {
                Some(n) => format!("{} - Lesson {}", hit.course_title, n),
                None => hit.course_title.clone(),
            };
            let link = match hit.lesson_number {
                Some(n) => self.db.get_lesson_link(&hit.course_title, n).ok().flatten(),
                None => None,
            }
            .or_else(|| self.course_link_for(&hit.course_title));
            sources.push(Source { text, link });
        }

        *self.sources.write() = sources;
        Ok(formatted.join("\n\n"))
    }

    fn last_sources(&self) -> Vec<Source> {
        self.sources.read().clone()
    }

    fn reset_sources(&self) {
        self.sources.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, CourseChunk, Lesson};
    use serde_json::json;

    fn seeded_tool() -> CourseSearchTool {
        let db = Arc::new(Database::new(":memory:").expect("in-memory db"));
        let course = Course {
            title: "Building Towards Computer Use with Anthropic".to_string(),
            course_link: Some("https://example.com/computer-use".to_string()),
            instructor: Some("Colt Steele".to_string()),
            lessons: vec![
                Lesson {
                    lesson_number: 1,
                    title: "Introduction".to_string(),
                    lesson_link: Some("https://example.com/lesson1".to_string()),
                },
                Lesson {
                    lesson_number: 2,
                    title: "API Basics".to_string(),
                    lesson_link: None,
                },
            ],
        };
        db.add_course_metadata(&course).expect("metadata");
        db.add_course_content(&[
            CourseChunk {
                content: "Course Building Towards Computer Use with Anthropic Lesson 1 content: \
                          Computer use lets Claude operate a virtual screen."
                    .to_string(),
                course_title: course.title.clone(),
                lesson_number: Some(1),
                chunk_index: 0,
            },
            CourseChunk {
                content: "Course Building Towards Computer Use with Anthropic Lesson 2 content: \
                          The messages API accepts tool definitions."
                    .to_string(),
                course_title: course.title.clone(),
                lesson_number: Some(2),
                chunk_index: 1,
            },
        ])
        .expect("content");

        CourseSearchTool::new(db, 5)
    }

    #[test]
    fn test_definition_shape() {
        let tool = seeded_tool();
        let definition = tool.definition();
        assert_eq!(definition.name, "search_course_content");
        assert_eq!(definition.input_schema.required, vec!["query".to_string()]);
        assert!(definition.input_schema.properties.contains_key("course_name"));
        assert!(definition.input_schema.properties.contains_key("lesson_number"));
    }

    #[tokio::test]
    async fn test_search_formats_hits_and_sources() {
        let tool = seeded_tool();
        let output = tool
            .execute(json!({"query": "virtual screen"}))
            .await
            .unwrap();

        assert!(output.starts_with("[Building Towards Computer Use with Anthropic - Lesson 1]\n"));
        assert!(output.contains("virtual screen"));

        let sources = tool.last_sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(
            sources[0].text,
            "Building Towards Computer Use with Anthropic - Lesson 1"
        );
        assert_eq!(sources[0].link.as_deref(), Some("https://example.com/lesson1"));
    }

    #[tokio::test]
    async fn test_source_link_falls_back_to_course_link() {
        let tool = seeded_tool();
        tool.execute(json!({"query": "messages API", "lesson_number": 2}))
            .await
            .unwrap();

        let sources = tool.last_sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(
            sources[0].link.as_deref(),
            Some("https://example.com/computer-use")
        );
    }

    #[tokio::test]
    async fn test_partial_course_name_resolves() {
        let tool = seeded_tool();
        let output = tool
            .execute(json!({"query": "screen", "course_name": "Computer Use"}))
            .await
            .unwrap();
        assert!(output.contains("[Building Towards Computer Use with Anthropic - Lesson 1]"));
    }

    #[tokio::test]
    async fn test_unknown_course_short_circuits() {
        let tool = seeded_tool();
        let output = tool
            .execute(json!({"query": "screen", "course_name": "Quantum Basket Weaving"}))
            .await
            .unwrap();
        assert_eq!(output, "No course found matching 'Quantum Basket Weaving'");
    }

    #[tokio::test]
    async fn test_empty_results_name_the_filters() {
        let tool = seeded_tool();
        let output = tool
            .execute(json!({
                "query": "blockchain",
                "course_name": "Computer Use",
                "lesson_number": 2
            }))
            .await
            .unwrap();
        assert_eq!(
            output,
            "No relevant content found in course 'Computer Use' in lesson 2."
        );
    }

    #[tokio::test]
    async fn test_invalid_parameters_error() {
        let tool = seeded_tool();
        let err = tool.execute(json!({"course_name": "MCP"})).await.unwrap_err();
        assert!(err.to_string().starts_with("Invalid parameters:"));
    }

    #[tokio::test]
    async fn test_reset_sources() {
        let tool = seeded_tool();
        tool.execute(json!({"query": "virtual screen"})).await.unwrap();
        assert!(!tool.last_sources().is_empty());
        tool.reset_sources();
        assert!(tool.last_sources().is_empty());
    }
}
