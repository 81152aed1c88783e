//! AI provider integration and response orchestration

pub mod claude;
pub mod generator;
pub mod types;

#[cfg(test)]
pub mod mock;


pub use claude::ClaudeClient;
pub use generator::{GenerateError, GeneratorConfig, ResponseGenerator, DEFAULT_INSTRUCTIONS};
pub use types::{
    AiError, ClaudeContentBlock, ClaudeMessage, ClaudeMessageContent, ClaudeTool, ModelRequest,
    ModelResponse, StopReason, ToolChoice,
};

#[cfg(test)]
pub use mock::MockAiClient;

use async_trait::async_trait;

/// Boundary to the hosted language model service
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Issue one completion request
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, AiError>;
}
