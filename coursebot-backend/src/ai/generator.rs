//! Multi-round response orchestration.
//!
//! `ResponseGenerator` drives the model through zero, one, or two rounds of
//! tool calls. Each round advertises the tool schemas with automatic tool
//! choice; a non-tool-use response ends the loop immediately. When the round
//! budget runs out a final tools-disabled request forces a synthesis of the
//! accumulated tool results.

use crate::ai::types::{
    AiError, ClaudeContentBlock, ClaudeMessage, ClaudeTool, ModelRequest, ToolChoice,
};
use crate::ai::AiClient;
use crate::tools::{ToolError, ToolRegistry};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_INSTRUCTIONS: &str = r#"You are an AI assistant specialized in course materials and educational content with access to comprehensive tools for course information.

Available Tools:
1. **search_course_content**: For searching specific content within course materials
2. **get_course_outline**: For getting complete course information including title, course link, and all lessons with their numbers and titles

Tool Usage Guidelines:
- **Course outline queries**: Use get_course_outline for questions about course structure, lesson lists, or course overviews
- **Content-specific questions**: Use search_course_content for questions about specific topics within course materials
- **General knowledge questions**: Answer using existing knowledge without using tools
- **Sequential tool calling**: You can make up to 2 rounds of tool calls to gather comprehensive information for complex queries
- Synthesize tool results into accurate, fact-based responses
- If a tool yields no results, state this clearly without offering alternatives

Multi-Step Query Examples:
- "Search for a course that discusses the same topic as lesson 3 of course X": first get the outline of course X to find the lesson 3 topic, then search for that topic
- "Compare the structure of course A and course B": get the outline of course A, then get the outline of course B
- "What comes after the introduction in course Y?": get the outline of course Y, then search lesson content if needed

When to Continue vs. Stop:
- **Continue to Round 2** if: you need information from a different source, a comparison requires multiple outlines, or first results point to related content worth retrieving
- **Stop after Round 1** if: a single tool call fully answers the question, or additional calls would not add useful information
- **Stop immediately** (no tools) if: general knowledge suffices or the tools are irrelevant to the question

Response Protocol:
- **No meta-commentary**: Provide direct answers only, without reasoning process or phrases like "based on the search results"
- **For outline queries**: Always include the course title, course link, and the complete numbered lesson list
- **For multi-step queries**: Synthesize all gathered information into one cohesive answer

All responses must be:
1. **Brief, Concise and focused**: Get to the point quickly
2. **Educational**: Maintain instructional value
3. **Clear**: Use accessible language
4. **Example-supported**: Include relevant examples when they aid understanding
Provide only the direct answer to what was asked."#;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub instructions: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_tool_rounds: u32,
    pub enable_sequential: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            temperature: 0.0,
            max_tokens: 800,
            max_tool_rounds: 2,
            enable_sequential: true,
        }
    }
}

#[derive(Debug)]
pub enum GenerateError {
    Model(AiError),
    Tool(ToolError),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Model(e) => write!(f, "{}", e),
            GenerateError::Tool(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::Model(e) => Some(e),
            GenerateError::Tool(e) => Some(e),
        }
    }
}

impl From<AiError> for GenerateError {
    fn from(e: AiError) -> Self {
        GenerateError::Model(e)
    }
}

impl From<ToolError> for GenerateError {
    fn from(e: ToolError) -> Self {
        GenerateError::Tool(e)
    }
}

/// One completed tool invocation, kept for round context and synthesis.
struct ToolRoundRecord {
    tool_use_id: String,
    tool_name: String,
    content: String,
    round: u32,
    parameters: Value,
    error: bool,
}

pub struct ResponseGenerator {
    client: Arc<dyn AiClient>,
    config: GeneratorConfig,
}

impl ResponseGenerator {
    pub fn new(client: Arc<dyn AiClient>, config: GeneratorConfig) -> Self {
        Self { client, config }
    }

    /// Produces an answer to `query`, optionally calling tools.
    ///
    /// The sequential path runs only when it can do anything useful: it needs
    /// tool schemas, a registry to execute them, and a budget of more than one
    /// round. Everything else goes through the single-round path.
    pub async fn generate(
        &self,
        query: &str,
        history: Option<&str>,
        tools: Option<&[ClaudeTool]>,
        registry: Option<&ToolRegistry>,
    ) -> Result<String, GenerateError> {
        if self.config.enable_sequential && self.config.max_tool_rounds > 1 {
            if let (Some(tools), Some(registry)) = (tools.filter(|t| !t.is_empty()), registry) {
                return self
                    .generate_sequential(query, history, tools, registry)
                    .await;
            }
        }

        self.generate_single_round(query, history, tools, registry)
            .await
    }

    fn base_system(&self, history: Option<&str>) -> String {
        match history.filter(|h| !h.is_empty()) {
            Some(history) => format!(
                "{}\n\nPrevious conversation:\n{}",
                self.config.instructions, history
            ),
            None => self.config.instructions.clone(),
        }
    }

    /// Single-round path: at most one round of tool use, and a tool failure
    /// propagates instead of being folded into the conversation.
    async fn generate_single_round(
        &self,
        query: &str,
        history: Option<&str>,
        tools: Option<&[ClaudeTool]>,
        registry: Option<&ToolRegistry>,
    ) -> Result<String, GenerateError> {
        let system = self.base_system(history);
        let tools = tools.filter(|t| !t.is_empty());
        let mut messages = vec![ClaudeMessage::user(query)];

        let request = ModelRequest {
            system: Some(system.clone()),
            messages: messages.clone(),
            tools: tools.map(|t| t.to_vec()),
            tool_choice: tools.map(|_| ToolChoice::Auto),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        let response = self.client.complete(request).await?;

        if response.is_tool_use() {
            if let Some(registry) = registry {
                let mut tool_results = Vec::new();
                for block in &response.content {
                    if let ClaudeContentBlock::ToolUse { id, name, input } = block {
                        let content = registry.execute_tool(name, input.clone()).await?;
                        tool_results.push(ClaudeContentBlock::tool_result(
                            id.clone(),
                            content,
                            false,
                        ));
                    }
                }

                messages.push(ClaudeMessage::assistant_with_blocks(response.content));
                messages.push(ClaudeMessage::user_with_tool_results(tool_results));

                let final_request = ModelRequest {
                    system: Some(system),
                    messages,
                    tools: None,
                    tool_choice: None,
                    temperature: self.config.temperature,
                    max_tokens: self.config.max_tokens,
                };
                let final_response = self.client.complete(final_request).await?;
                return Ok(final_response.first_text());
            }
        }

        Ok(response.first_text())
    }

    /// Sequential path: up to `max_tool_rounds` rounds of tool calls, then a
    /// forced tools-disabled synthesis when the budget runs out.
    async fn generate_sequential(
        &self,
        query: &str,
        history: Option<&str>,
        tools: &[ClaudeTool],
        registry: &ToolRegistry,
    ) -> Result<String, GenerateError> {
        let max_rounds = self.config.max_tool_rounds;
        log::debug!(
            "[GENERATOR] Starting sequential generation (max {} rounds)",
            max_rounds
        );

        let base_system = self.base_system(history);
        let mut messages = vec![ClaudeMessage::user(query)];
        let mut records: Vec<ToolRoundRecord> = Vec::new();
        let mut current_round: u32 = 1;

        while current_round <= max_rounds {
            let round_context = build_round_context(current_round, &records);
            let request = ModelRequest {
                system: Some(format!("{}\n\n{}", base_system, round_context)),
                messages: messages.clone(),
                tools: Some(tools.to_vec()),
                tool_choice: Some(ToolChoice::Auto),
                temperature: self.config.temperature,
                max_tokens: self.config.max_tokens,
            };
            let response = self.client.complete(request).await?;

            if !response.is_tool_use() {
                // Direct answer, no matter which round we are in
                return Ok(response.first_text());
            }

            // Execute every requested tool in emission order. A failure is
            // recorded as an error-flagged result and the round continues.
            for block in &response.content {
                if let ClaudeContentBlock::ToolUse { id, name, input } = block {
                    let (content, error) = match registry.execute_tool(name, input.clone()).await
                    {
                        Ok(content) => (content, false),
                        Err(e) => {
                            log::warn!(
                                "[GENERATOR] Tool {} failed in round {}: {}",
                                name,
                                current_round,
                                e
                            );
                            (format!("Tool execution failed: {}", e), true)
                        }
                    };
                    records.push(ToolRoundRecord {
                        tool_use_id: id.clone(),
                        tool_name: name.clone(),
                        content,
                        round: current_round,
                        parameters: input.clone(),
                        error,
                    });
                }
            }

            let round_results: Vec<ClaudeContentBlock> = records
                .iter()
                .filter(|record| record.round == current_round)
                .map(|record| {
                    log::debug!(
                        "[GENERATOR] Round {} {} {} -> {} chars{}",
                        record.round,
                        record.tool_name,
                        record.parameters,
                        record.content.len(),
                        if record.error { " (failed)" } else { "" },
                    );
                    ClaudeContentBlock::tool_result(
                        record.tool_use_id.clone(),
                        record.content.clone(),
                        false,
                    )
                })
                .collect();

            messages.push(ClaudeMessage::assistant_with_blocks(response.content));
            messages.push(ClaudeMessage::user_with_tool_results(round_results));

            current_round += 1;
        }

        log::debug!(
            "[GENERATOR] Tool rounds exhausted after {} result(s), synthesizing",
            records.len()
        );
        self.synthesize(&base_system, messages, &records).await
    }

    /// Final tools-disabled request that folds all tool results into one
    /// answer. Runs even when the last round already looks conclusive.
    async fn synthesize(
        &self,
        base_system: &str,
        mut messages: Vec<ClaudeMessage>,
        records: &[ToolRoundRecord],
    ) -> Result<String, GenerateError> {
        messages.push(ClaudeMessage::user(format!(
            "All tool rounds completed. Synthesize the information to answer the original query.\n\n\
             Tool Results Summary:\n{}\n\n\
             Provide a comprehensive answer to the original query using all gathered information.",
            format_round_results(records)
        )));

        let request = ModelRequest {
            system: Some(base_system.to_string()),
            messages,
            tools: None,
            tool_choice: None,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        let response = self.client.complete(request).await?;
        Ok(response.first_text())
    }
}

/// Per-round guidance appended to the system content. Rounds after the first
/// carry a digest of the most recent tool results.
fn build_round_context(round: u32, records: &[ToolRoundRecord]) -> String {
    if round == 1 || records.is_empty() {
        return format!("Round {}: Initial analysis of query.", round);
    }

    let mut lines = vec![format!("Round {}: Previous tool results available:", round)];
    let start = records.len().saturating_sub(3);
    for (i, record) in records[start..].iter().enumerate() {
        lines.push(format!(
            "- Tool {}: {} → {}...",
            i + 1,
            record.tool_name,
            preview(&record.content, 200)
        ));
    }
    lines.push(
        "Use this information to decide if you need additional tool calls or can provide a complete answer."
            .to_string(),
    );
    lines.join("\n")
}

/// Renders all tool results grouped by round for the synthesis prompt.
fn format_round_results(records: &[ToolRoundRecord]) -> String {
    if records.is_empty() {
        return "No tool results available.".to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current_round: Option<u32> = None;
    let mut entries: Vec<String> = Vec::new();

    for record in records {
        if current_round != Some(record.round) {
            if let Some(round) = current_round {
                lines.push(format!("Round {}: {}", round, entries.join(", ")));
                entries.clear();
            }
            current_round = Some(record.round);
        }
        entries.push(format!(
            "{} → {}...",
            record.tool_name,
            preview(&record.content, 150)
        ));
    }
    if let Some(round) = current_round {
        lines.push(format!("Round {}: {}", round, entries.join(", ")));
    }

    lines.join("\n")
}

// Character-based so multi-byte content cannot split mid-codepoint
fn preview(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(round: u32, name: &str, content: &str) -> ToolRoundRecord {
        ToolRoundRecord {
            tool_use_id: format!("tool_{}_{}", round, name),
            tool_name: name.to_string(),
            content: content.to_string(),
            round,
            parameters: serde_json::json!({}),
            error: false,
        }
    }

    #[test]
    fn test_round_context_first_round() {
        let context = build_round_context(1, &[]);
        assert_eq!(context, "Round 1: Initial analysis of query.");
    }

    #[test]
    fn test_round_context_without_results_stays_initial() {
        let context = build_round_context(2, &[]);
        assert_eq!(context, "Round 2: Initial analysis of query.");
    }

    #[test]
    fn test_round_context_digests_last_three_results() {
        let records = vec![
            record(1, "get_course_outline", "outline one"),
            record(1, "get_course_outline", "outline two"),
            record(1, "search_course_content", "search one"),
            record(2, "search_course_content", "search two"),
        ];

        let context = build_round_context(3, &records);
        let lines: Vec<&str> = context.lines().collect();
        assert_eq!(lines[0], "Round 3: Previous tool results available:");
        assert_eq!(lines[1], "- Tool 1: get_course_outline → outline two...");
        assert_eq!(lines[2], "- Tool 2: search_course_content → search one...");
        assert_eq!(lines[3], "- Tool 3: search_course_content → search two...");
        assert_eq!(
            lines[4],
            "Use this information to decide if you need additional tool calls or can provide a complete answer."
        );
        assert!(!context.contains("outline one"));
    }

    #[test]
    fn test_round_context_truncates_long_content() {
        let long = "x".repeat(300);
        let records = vec![record(1, "search_course_content", &long)];
        let context = build_round_context(2, &records);

        let digest_line = context.lines().nth(1).unwrap();
        assert!(digest_line.ends_with("..."));
        assert!(digest_line.contains(&"x".repeat(200)));
        assert!(!digest_line.contains(&"x".repeat(201)));
    }

    #[test]
    fn test_format_round_results_empty() {
        assert_eq!(format_round_results(&[]), "No tool results available.");
    }

    #[test]
    fn test_format_round_results_groups_by_round() {
        let records = vec![
            record(1, "get_course_outline", "outline"),
            record(1, "search_course_content", "first search"),
            record(2, "search_course_content", "second search"),
        ];

        let summary = format_round_results(&records);
        assert_eq!(
            summary,
            "Round 1: get_course_outline → outline..., search_course_content → first search...\n\
             Round 2: search_course_content → second search..."
        );
    }

    #[test]
    fn test_format_round_results_truncates_at_150() {
        let long = "y".repeat(200);
        let records = vec![record(1, "search_course_content", &long)];
        let summary = format_round_results(&records);
        assert!(summary.contains(&"y".repeat(150)));
        assert!(!summary.contains(&"y".repeat(151)));
    }

    #[test]
    fn test_preview_is_char_based() {
        let text = "é".repeat(10);
        assert_eq!(preview(&text, 4), "éééé");
        assert_eq!(preview("short", 200), "short");
    }

    #[test]
    fn test_default_instructions_describe_the_tools() {
        assert!(DEFAULT_INSTRUCTIONS.contains("search_course_content"));
        assert!(DEFAULT_INSTRUCTIONS.contains("get_course_outline"));
        assert!(DEFAULT_INSTRUCTIONS.contains("up to 2 rounds"));
    }
}
