//! OpenAI-compatible chat completions client

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::LlmError;
use crate::message::{ChatMessage, ContentSegment, MessageContent, Role, ToolCall};
use crate::provider::{ChatProvider, ChatRequest, ChatResponse, TokenUsage, ToolDefinition};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Retry policy for transient provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryConfig {
    /// No retries at all
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Backoff before retry number `attempt` (0-based), doubling each time
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDefinition],
}

fn no_tools(tools: &&[ToolDefinition]) -> bool {
    tools.is_empty()
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&ChatMessage> for WireMessage {
    fn from(msg: &ChatMessage) -> Self {
        // Reasoning is never replayed; only the text reaches the wire
        let text = msg.text();
        let content = if text.is_empty() && msg.role == Role::Assistant && msg.has_tool_calls() {
            None
        } else {
            Some(text)
        };

        Self {
            role: msg.role.as_str(),
            content,
            tool_calls: msg.tool_calls.iter().map(WireToolCall::from).collect(),
            tool_call_id: msg.tool_call_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: WireFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded arguments
    #[serde(default)]
    arguments: String,
}

impl From<&ToolCall> for WireToolCall {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            call_type: function_type(),
            function: WireFunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.to_string(),
            },
        }
    }
}

impl From<WireToolCall> for ToolCall {
    fn from(call: WireToolCall) -> Self {
        ToolCall {
            id: call.id,
            name: call.function.name,
            arguments: parse_arguments(call.function.arguments),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<Value>,
    #[serde(default)]
    reasoning_content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl WireResponse {
    fn into_response(self) -> Result<ChatResponse, LlmError> {
        let usage = self.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        });

        let choice = self.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;
        let WireResponseMessage {
            content,
            reasoning_content,
            tool_calls,
        } = choice.message;

        let content = decode_content(content, reasoning_content);
        let tool_calls: Vec<ToolCall> = tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(ToolCall::from)
            .collect();

        Ok(ChatResponse {
            message: ChatMessage::assistant_with_tools(content, tool_calls),
            usage,
            finish_reason: choice.finish_reason,
        })
    }
}

/// Decide the content shape once.
///
/// A plain string becomes [`MessageContent::Text`]. Arrays of typed parts
/// (`text`, `reasoning`, `thinking`) and a separate `reasoning_content` field
/// become [`MessageContent::Segments`], reasoning first. Anything else is kept
/// verbatim as its JSON text.
fn decode_content(content: Option<Value>, reasoning_content: Option<String>) -> MessageContent {
    let mut segments = Vec::new();
    if let Some(reasoning) = reasoning_content.filter(|r| !r.is_empty()) {
        segments.push(ContentSegment::reasoning(reasoning));
    }

    match content {
        None | Some(Value::Null) => {}
        Some(Value::String(text)) => {
            if segments.is_empty() {
                return MessageContent::Text(text);
            }
            if !text.is_empty() {
                segments.push(ContentSegment::text(text));
            }
        }
        Some(Value::Array(parts)) => {
            let before = segments.len();
            for part in &parts {
                if let Some(segment) = decode_part(part) {
                    segments.push(segment);
                } else {
                    debug!(part = %part, "Skipping unrecognized content part");
                }
            }
            if segments.len() == before && !parts.is_empty() {
                warn!("No recognizable content parts, keeping raw content");
                segments.push(ContentSegment::text(Value::Array(parts).to_string()));
            }
        }
        Some(other) => segments.push(ContentSegment::text(other.to_string())),
    }

    if segments.is_empty() {
        MessageContent::Text(String::new())
    } else {
        MessageContent::Segments(segments)
    }
}

fn decode_part(part: &Value) -> Option<ContentSegment> {
    let kind = part.get("type")?.as_str()?;
    let field = |name: &str| part.get(name).and_then(Value::as_str).map(str::to_string);

    match kind {
        "text" | "output_text" => field("text").map(ContentSegment::text),
        "reasoning" => field("reasoning").map(ContentSegment::reasoning),
        "thinking" => field("thinking").map(ContentSegment::reasoning),
        _ => None,
    }
}

/// Tool-call arguments arrive JSON-encoded; keep the raw string if they don't parse
fn parse_arguments(raw: String) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    }
}

/// OpenAI-compatible API client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    retry: RetryConfig,
}

impl OpenAiClient {
    /// Create a client with the given request timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send_once(
        &self,
        url: &str,
        body: &WireRequest<'_>,
    ) -> Result<ChatResponse, LlmError> {
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }

        let wire: WireResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;
        wire.into_response()
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(
        skip(self, request),
        fields(model = %request.model, messages = request.messages.len())
    )]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = WireRequest {
            model: &request.model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            tools: &request.tools,
        };

        let mut attempt = 0;
        loop {
            match self.send_once(&url, &body).await {
                Ok(response) => {
                    debug!(
                        tool_calls = response.message.tool_calls.len(),
                        finish_reason = ?response.finish_reason,
                        "Chat completion received"
                    );
                    return Ok(response);
                }
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying chat completion"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
