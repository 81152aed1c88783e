use crate::ai::types::ClaudeTool;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Error from tool parameter validation or execution
#[derive(Debug, Clone)]
pub struct ToolError {
    pub message: String,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ToolError {}

impl From<String> for ToolError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ToolError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// JSON Schema fragment for a single tool parameter
#[derive(Debug, Clone, Serialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub description: String,
}

impl PropertySchema {
    pub fn string(description: &str) -> Self {
        Self {
            schema_type: "string".to_string(),
            description: description.to_string(),
        }
    }

    pub fn integer(description: &str) -> Self {
        Self {
            schema_type: "integer".to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: HashMap<String, PropertySchema>,
    pub required: Vec<String>,
}

impl ToolInputSchema {
    pub fn object(properties: HashMap<String, PropertySchema>, required: Vec<String>) -> Self {
        Self {
            schema_type: "object".to_string(),
            properties,
            required,
        }
    }
}

/// Tool description in the shape the Anthropic API expects
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: ToolInputSchema,
}

impl ToolDefinition {
    pub fn to_claude_tool(&self) -> ClaudeTool {
        ClaudeTool {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: serde_json::to_value(&self.input_schema).unwrap_or(Value::Null),
        }
    }
}

/// Provenance entry surfaced to the UI alongside an answer
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definition_serializes_to_api_shape() {
        let mut properties = HashMap::new();
        properties.insert(
            "query".to_string(),
            PropertySchema::string("What to search for"),
        );

        let definition = ToolDefinition {
            name: "search_course_content".to_string(),
            description: "Search course materials".to_string(),
            input_schema: ToolInputSchema::object(properties, vec!["query".to_string()]),
        };

        let tool = definition.to_claude_tool();
        assert_eq!(tool.name, "search_course_content");
        assert_eq!(tool.input_schema["type"], "object");
        assert_eq!(
            tool.input_schema["properties"]["query"]["type"],
            "string"
        );
        assert_eq!(tool.input_schema["required"][0], "query");
    }

    #[test]
    fn test_source_skips_missing_link() {
        let source = Source {
            text: "Intro to MCP - Lesson 1".to_string(),
            link: None,
        };
        let json = serde_json::to_string(&source).unwrap();
        assert_eq!(json, r#"{"text":"Intro to MCP - Lesson 1"}"#);

        let linked = Source {
            text: "Intro to MCP".to_string(),
            link: Some("https://example.com/mcp".to_string()),
        };
        let json = serde_json::to_string(&linked).unwrap();
        assert!(json.contains("https://example.com/mcp"));
    }

    #[test]
    fn test_tool_error_display() {
        let err = ToolError::new("Invalid parameters: missing field `query`");
        assert_eq!(
            err.to_string(),
            "Invalid parameters: missing field `query`"
        );
    }
}
