use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// AI API error with status code information
#[derive(Debug, Clone)]
pub struct AiError {
    /// Error message
    pub message: String,
    /// HTTP status code if available
    pub status_code: Option<u16>,
}

impl AiError {
    pub fn new(message: impl Into<String>) -> Self {
        AiError {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status_code: u16) -> Self {
        AiError {
            message: message.into(),
            status_code: Some(status_code),
        }
    }
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.status_code {
            write!(f, "[HTTP {}] {}", code, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for AiError {}

impl From<String> for AiError {
    fn from(s: String) -> Self {
        AiError::new(s)
    }
}

impl From<&str> for AiError {
    fn from(s: &str) -> Self {
        AiError::new(s)
    }
}

/// Tool definition in Claude API format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Tool choice options for the Claude API
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// Model decides whether to use tools
    Auto,
    /// Model MUST use a tool
    #[allow(dead_code)]
    Any,
    /// Model MUST use the specified tool
    #[allow(dead_code)]
    Tool { name: String },
}

/// Content block types in Claude API messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClaudeContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

impl ClaudeContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ClaudeContentBlock::Text { text: text.into() }
    }

    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        ClaudeContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    pub fn tool_result(tool_use_id: String, content: String, is_error: bool) -> Self {
        ClaudeContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error: if is_error { Some(true) } else { None },
        }
    }
}

/// Message with tool content for Claude API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeMessage {
    pub role: String,
    pub content: ClaudeMessageContent,
}

/// Content can be either a string or array of content blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaudeMessageContent {
    Text(String),
    Blocks(Vec<ClaudeContentBlock>),
}

impl ClaudeMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ClaudeMessage {
            role: "user".to_string(),
            content: ClaudeMessageContent::Text(content.into()),
        }
    }

    pub fn assistant_with_blocks(blocks: Vec<ClaudeContentBlock>) -> Self {
        ClaudeMessage {
            role: "assistant".to_string(),
            content: ClaudeMessageContent::Blocks(blocks),
        }
    }

    pub fn user_with_tool_results(results: Vec<ClaudeContentBlock>) -> Self {
        ClaudeMessage {
            role: "user".to_string(),
            content: ClaudeMessageContent::Blocks(results),
        }
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    Other,
}

impl StopReason {
    pub fn from_str(s: &str) -> Self {
        match s {
            "end_turn" => StopReason::EndTurn,
            "tool_use" => StopReason::ToolUse,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            _ => StopReason::Other,
        }
    }
}

/// One request to the model service: system text, accumulated conversation,
/// and optional tool schemas with a tool-choice policy.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<ClaudeMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ClaudeTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Typed model response: ordered content blocks plus the stop reason
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub content: Vec<ClaudeContentBlock>,
    pub stop_reason: Option<StopReason>,
}

/// Constructors for scripting canned responses in tests.
#[cfg(test)]
impl ModelResponse {
    pub fn text(content: impl Into<String>) -> Self {
        ModelResponse {
            content: vec![ClaudeContentBlock::text(content)],
            stop_reason: Some(StopReason::EndTurn),
        }
    }

    pub fn tool_use(blocks: Vec<ClaudeContentBlock>) -> Self {
        ModelResponse {
            content: blocks,
            stop_reason: Some(StopReason::ToolUse),
        }
    }
}

impl ModelResponse {
    /// Check if the model wants to use tools
    pub fn is_tool_use(&self) -> bool {
        self.stop_reason == Some(StopReason::ToolUse)
    }

    /// First text block of the response, or empty when there is none
    pub fn first_text(&self) -> String {
        self.content
            .iter()
            .find_map(|block| match block {
                ClaudeContentBlock::Text { text } => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_error_display() {
        let plain = AiError::new("request failed");
        assert_eq!(plain.to_string(), "request failed");

        let with_status = AiError::with_status("overloaded", 529);
        assert_eq!(with_status.to_string(), "[HTTP 529] overloaded");
        assert_eq!(with_status.status_code, Some(529));
    }

    #[test]
    fn test_content_block_serialization() {
        let block = ClaudeContentBlock::tool_use(
            "tool_123",
            "search_course_content",
            serde_json::json!({"query": "computer use"}),
        );
        let json = serde_json::to_value(&block).unwrap();

        assert_eq!(json["type"], "tool_use");
        assert_eq!(json["name"], "search_course_content");
        assert_eq!(json["input"]["query"], "computer use");
    }

    #[test]
    fn test_tool_result_skips_is_error_on_success() {
        let ok = ClaudeContentBlock::tool_result("tool_123".to_string(), "result".to_string(), false);
        let json = serde_json::to_value(&ok).unwrap();
        assert!(json.get("is_error").is_none());

        let failed = ClaudeContentBlock::tool_result("tool_124".to_string(), "boom".to_string(), true);
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["is_error"], true);
    }

    #[test]
    fn test_message_content_shapes() {
        let plain = ClaudeMessage::user("hello");
        let json = serde_json::to_value(&plain).unwrap();
        assert_eq!(json["content"], "hello");

        let blocks = ClaudeMessage::user_with_tool_results(vec![ClaudeContentBlock::tool_result(
            "id".to_string(),
            "output".to_string(),
            false,
        )]);
        let json = serde_json::to_value(&blocks).unwrap();
        assert!(json["content"].is_array());
    }

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(StopReason::from_str("end_turn"), StopReason::EndTurn);
        assert_eq!(StopReason::from_str("tool_use"), StopReason::ToolUse);
        assert_eq!(StopReason::from_str("pause_turn"), StopReason::Other);
    }

    #[test]
    fn test_model_response_helpers() {
        let direct = ModelResponse::text("Paris is the capital of France.");
        assert!(!direct.is_tool_use());
        assert_eq!(direct.first_text(), "Paris is the capital of France.");

        let tools = ModelResponse::tool_use(vec![ClaudeContentBlock::tool_use(
            "tool_123",
            "get_course_outline",
            serde_json::json!({"course_name": "MCP"}),
        )]);
        assert!(tools.is_tool_use());
        assert_eq!(tools.first_text(), "");
    }
}
