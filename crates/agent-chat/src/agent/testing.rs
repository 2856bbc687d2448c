//! Scripted provider for exercising the agent without a network

use std::collections::VecDeque;

use async_trait::async_trait;
use llm_core::{ChatMessage, ChatProvider, ChatRequest, ChatResponse, LlmError, TokenUsage};
use parking_lot::Mutex;

/// Replays canned replies in order and records every request
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<ChatMessage, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<ChatMessage, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests.lock().push(request.clone());
        let reply = self.replies.lock().pop_front().unwrap_or(Err(LlmError::EmptyResponse))?;
        Ok(ChatResponse {
            message: reply,
            usage: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
            }),
            finish_reason: None,
        })
    }
}
