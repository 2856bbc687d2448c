//! Agent state management

use llm_core::{ChatMessage, LlmError, TokenUsage, ToolCall};
use serde_json::json;
use thiserror::Error;

/// Default model tool rounds per user turn
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = llm_core::config::DEFAULT_MAX_TOOL_ROUNDS;

/// Call id of the seeded memory lookup
const MEMORY_CALL_ID: &str = "memory_seed";

/// Configuration for the agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model to use
    pub model: String,
    /// System prompt
    pub system_prompt: String,
    /// Memory note replayed as a prior `get_memory` tool result
    pub memory: Option<String>,
    /// Model responses with tool calls allowed per user turn
    pub max_tool_rounds: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: llm_core::config::DEFAULT_MODEL.to_string(),
            system_prompt: llm_core::config::DEFAULT_SYSTEM_PROMPT.to_string(),
            memory: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

impl AgentConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_memory(mut self, memory: Option<String>) -> Self {
        self.memory = memory.filter(|m| !m.trim().is_empty());
        self
    }

    pub fn with_max_tool_rounds(mut self, max: usize) -> Self {
        self.max_tool_rounds = max;
        self
    }

    /// Fixed turns sent ahead of the conversation on every request.
    ///
    /// These never enter the conversation itself, so clearing it keeps them.
    pub fn preamble(&self) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.system_prompt.clone())];

        if let Some(memory) = &self.memory {
            messages.push(ChatMessage::assistant_with_tools(
                "",
                vec![ToolCall::new(MEMORY_CALL_ID, "get_memory", json!({}))],
            ));
            messages.push(ChatMessage::tool_result(MEMORY_CALL_ID, memory.clone()));
        }

        messages
    }
}

/// Where the loop is within one user turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    AwaitingModel,
    AwaitingTools,
    Done,
}

/// State of the agent during one user turn
#[derive(Debug)]
pub struct AgentState {
    pub phase: LoopPhase,
    /// Model responses that requested tools so far
    pub tool_rounds: usize,
    /// Tokens reported across all model calls of the turn
    pub usage: TokenUsage,
}

impl AgentState {
    pub fn new() -> Self {
        Self {
            phase: LoopPhase::AwaitingModel,
            tool_rounds: 0,
            usage: TokenUsage::default(),
        }
    }

    pub fn record_usage(&mut self, usage: Option<TokenUsage>) {
        if let Some(usage) = usage {
            self.usage.prompt_tokens += usage.prompt_tokens;
            self.usage.completion_tokens += usage.completion_tokens;
        }
    }
}

impl Default for AgentState {
    fn default() -> Self {
        Self::new()
    }
}

/// Failures that end a user turn
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model request failed: {0}")]
    Model(#[from] LlmError),

    #[error("model requested unknown tool '{0}'")]
    UnknownTool(String),

    #[error("no final answer after {0} tool rounds")]
    ToolLoopLimit(usize),
}
