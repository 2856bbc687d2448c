//! llm-core: Shared library for hosted LLM access
//!
//! Provides:
//! - Environment configuration (.env + process env)
//! - Chat message model with typed content segments
//! - The `ChatProvider` boundary and an OpenAI-compatible client
//! - Tavily web search client

pub mod config;
pub mod error;
pub mod message;
pub mod openai;
pub mod provider;
pub mod search;

pub use config::Config;
pub use error::LlmError;
pub use message::{ChatMessage, ContentSegment, MessageContent, Role, ToolCall};
pub use openai::{OpenAiClient, RetryConfig};
pub use provider::{
    ChatProvider, ChatRequest, ChatResponse, FunctionDefinition, TokenUsage, ToolDefinition,
};
pub use search::{SearchHit, TavilyClient};
