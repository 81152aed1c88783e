use crate::ai::types::{
    AiError, ClaudeContentBlock, ClaudeMessage, ClaudeTool, ModelRequest, ModelResponse,
    StopReason, ToolChoice,
};
use crate::ai::AiClient;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Anthropic Messages API client
#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    auth_headers: header::HeaderMap,
    endpoint: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ClaudeApiRequest {
    model: String,
    messages: Vec<ClaudeMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ClaudeTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Deserialize)]
struct ClaudeCompletionResponse {
    content: Vec<ClaudeResponseContent>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponseContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorResponse {
    error: ClaudeError,
}

#[derive(Debug, Deserialize)]
struct ClaudeError {
    message: String,
}

impl ClaudeClient {
    pub fn new(api_key: &str, endpoint: Option<&str>, model: Option<&str>) -> Result<Self, String> {
        let mut auth_headers = header::HeaderMap::new();
        auth_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let auth_value = header::HeaderValue::from_str(api_key)
            .map_err(|e| format!("Invalid API key format: {}", e))?;
        auth_headers.insert("x-api-key", auth_value);
        auth_headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static("2023-06-01"),
        );

        Ok(Self {
            client: crate::http::shared_client().clone(),
            auth_headers,
            endpoint: endpoint
                .unwrap_or("https://api.anthropic.com/v1/messages")
                .to_string(),
            model: model.unwrap_or("claude-sonnet-4-20250514").to_string(),
        })
    }
}

#[async_trait]
impl AiClient for ClaudeClient {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, AiError> {
        let api_request = ClaudeApiRequest {
            model: self.model.clone(),
            messages: request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system,
            tools: request.tools,
            tool_choice: request.tool_choice,
        };

        log::debug!(
            "Sending request to Claude API: {}",
            serde_json::to_string_pretty(&api_request).unwrap_or_default()
        );

        // Retry configuration for transient errors
        const MAX_RETRIES: u32 = 3;
        const BASE_DELAY_MS: u64 = 2000;

        let mut last_error: Option<(String, Option<u16>)> = None;
        let mut response_data_opt: Option<ClaudeCompletionResponse> = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay_ms = BASE_DELAY_MS * (1 << (attempt - 1));
                log::warn!(
                    "[CLAUDE] Retry attempt {}/{} after {}ms delay",
                    attempt,
                    MAX_RETRIES,
                    delay_ms
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            let request_result = self
                .client
                .post(&self.endpoint)
                .headers(self.auth_headers.clone())
                .json(&api_request)
                .send()
                .await;

            let response = match request_result {
                Ok(r) => r,
                Err(e) => {
                    if attempt < MAX_RETRIES {
                        log::warn!(
                            "[CLAUDE] Request failed (attempt {}): {}, will retry",
                            attempt + 1,
                            e
                        );
                        last_error = Some((format!("Claude API request failed: {}", e), None));
                        continue;
                    }
                    return Err(AiError::new(format!("Claude API request failed: {}", e)));
                }
            };

            let status = response.status();
            let status_code = status.as_u16();
            let is_retryable = matches!(status_code, 429 | 502 | 503 | 504);

            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();

                if is_retryable && attempt < MAX_RETRIES {
                    log::warn!(
                        "[CLAUDE] Received retryable status {} (attempt {}), will retry",
                        status,
                        attempt + 1
                    );
                    last_error = Some((format!("HTTP {}: {}", status, error_text), Some(status_code)));
                    continue;
                }

                let error_msg = if let Ok(error_response) =
                    serde_json::from_str::<ClaudeErrorResponse>(&error_text)
                {
                    format!("Claude API error: {}", error_response.error.message)
                } else {
                    format!(
                        "Claude API returned error status: {}, body: {}",
                        status, error_text
                    )
                };

                return Err(AiError::with_status(error_msg, status_code));
            }

            response_data_opt = Some(
                response
                    .json()
                    .await
                    .map_err(|e| AiError::new(format!("Failed to parse Claude response: {}", e)))?,
            );
            break;
        }

        let response_data = response_data_opt.ok_or_else(|| {
            let (msg, code) =
                last_error.unwrap_or_else(|| ("Max retries exceeded".to_string(), None));
            match code {
                Some(c) => AiError::with_status(msg, c),
                None => AiError::new(msg),
            }
        })?;

        // Map loose wire blocks into the typed sum type, skipping unknown kinds
        let mut content = Vec::new();
        for block in response_data.content {
            match block.content_type.as_str() {
                "text" => {
                    if let Some(text) = block.text {
                        content.push(ClaudeContentBlock::text(text));
                    }
                }
                "tool_use" => {
                    if let (Some(id), Some(name), Some(input)) = (block.id, block.name, block.input)
                    {
                        content.push(ClaudeContentBlock::tool_use(id, name, input));
                    }
                }
                _ => {}
            }
        }

        Ok(ModelResponse {
            content,
            stop_reason: response_data.stop_reason.as_deref().map(StopReason::from_str),
        })
    }
}
