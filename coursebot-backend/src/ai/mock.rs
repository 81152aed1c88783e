//! Scripted AI client used by orchestration and RAG tests.

use crate::ai::types::{AiError, ModelRequest, ModelResponse};
use crate::ai::AiClient;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Returns canned responses in order and records every request it receives.
pub struct MockAiClient {
    responses: Mutex<VecDeque<Result<ModelResponse, AiError>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl MockAiClient {
    pub fn new(responses: Vec<Result<ModelResponse, AiError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of requests the client has served so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Clone of the request at `index`, panicking when fewer calls were made.
    pub fn request(&self, index: usize) -> ModelRequest {
        self.requests.lock()[index].clone()
    }
}

#[async_trait]
impl AiClient for MockAiClient {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, AiError> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(ModelResponse::text("Default response")))
    }
}
