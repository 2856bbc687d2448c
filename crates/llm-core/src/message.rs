//! Chat message data model shared by the client and the agent

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Result of a tool call, answering an earlier assistant request
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed piece of structured assistant content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentSegment {
    Text { text: String },
    Reasoning { reasoning: String },
}

impl ContentSegment {
    pub fn text(text: impl Into<String>) -> Self {
        ContentSegment::Text { text: text.into() }
    }

    pub fn reasoning(reasoning: impl Into<String>) -> Self {
        ContentSegment::Reasoning {
            reasoning: reasoning.into(),
        }
    }
}

/// Message content, either plain text or an ordered list of segments.
///
/// The shape is decided once when a provider response is decoded, so
/// downstream code matches on this enum instead of inspecting raw JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Segments(Vec<ContentSegment>),
}

impl MessageContent {
    /// Concatenation of all text (reasoning excluded)
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Segments(segments) => segments
                .iter()
                .filter_map(|s| match s {
                    ContentSegment::Text { text } => Some(text.as_str()),
                    ContentSegment::Reasoning { .. } => None,
                })
                .collect(),
        }
    }

    /// Whether any non-empty text is present
    pub fn has_text(&self) -> bool {
        !self.text().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(s) => s.is_empty(),
            MessageContent::Segments(segments) => segments.is_empty(),
        }
    }
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Text(s.to_string())
    }
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back on the result
    pub id: String,
    pub name: String,
    /// Arguments as JSON
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// A single turn in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
    /// Tool calls requested by an assistant turn
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Call id a tool-result turn answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Assistant turn carrying tool-call requests
    pub fn assistant_with_tools(
        content: impl Into<MessageContent>,
        tool_calls: Vec<ToolCall>,
    ) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    /// Tool-result turn answering `call_id`
    pub fn tool_result(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::new(Role::Tool, output.into())
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Plain text of the content (reasoning excluded)
    pub fn text(&self) -> String {
        self.content.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_segment_text_excludes_reasoning() {
        let content = MessageContent::Segments(vec![
            ContentSegment::reasoning("let me think"),
            ContentSegment::text("The answer "),
            ContentSegment::text("is 8."),
        ]);
        assert_eq!(content.text(), "The answer is 8.");
        assert!(content.has_text());
    }

    #[test]
    fn test_reasoning_only_has_no_text() {
        let content = MessageContent::Segments(vec![ContentSegment::reasoning("hmm")]);
        assert!(!content.has_text());
        assert!(!content.is_empty());
    }

    #[test]
    fn test_segments_serialize_with_type_tag() {
        let content = MessageContent::Segments(vec![ContentSegment::reasoning("hmm")]);
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json, json!([{"type": "reasoning", "reasoning": "hmm"}]));
    }

    #[test]
    fn test_plain_text_serializes_as_string() {
        let content = MessageContent::from("hello");
        assert_eq!(serde_json::to_string(&content).unwrap(), "\"hello\"");
    }

    #[test]
    fn test_tool_result_constructor() {
        let msg = ChatMessage::tool_result("call_1", "2+2 = 4");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.text(), "2+2 = 4");
    }

    #[test]
    fn test_assistant_with_tools() {
        let call = ToolCall::new("call_1", "calculator", json!({"expression": "1+1"}));
        let msg = ChatMessage::assistant_with_tools("", vec![call]);
        assert!(msg.has_tool_calls());
        assert_eq!(msg.role, Role::Assistant);
    }
}
