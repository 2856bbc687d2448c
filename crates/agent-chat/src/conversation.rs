//! Conversation history
//!
//! The ordered list of turns for one chat session. It lives in memory only
//! and never contains the system prompt or seeded memory.

use llm_core::{ChatMessage, Role};

/// In-memory conversation
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Unique identifier, used to correlate logs
    pub id: String,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            messages: Vec::new(),
        }
    }

    /// Add a message to the conversation
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Drop all turns; clearing an empty conversation is a no-op
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Ids breaking the call/result pairing.
    ///
    /// Every tool call must be answered by exactly one tool-result turn with
    /// its id before the next assistant turn. Returns unanswered call ids and
    /// ids of results that answer nothing outstanding.
    #[cfg(test)]
    pub fn tool_call_violations(&self) -> Vec<String> {
        let mut pending: Vec<&str> = Vec::new();
        let mut violations = Vec::new();

        for message in &self.messages {
            match message.role {
                Role::Assistant => {
                    violations.extend(pending.drain(..).map(String::from));
                    pending.extend(message.tool_calls.iter().map(|c| c.id.as_str()));
                }
                Role::Tool => {
                    let id = message.tool_call_id.as_deref().unwrap_or_default();
                    match pending.iter().position(|p| *p == id) {
                        Some(pos) => {
                            pending.remove(pos);
                        }
                        None => violations.push(id.to_string()),
                    }
                }
                Role::User | Role::System => {}
            }
        }

        violations.extend(pending.into_iter().map(String::from));
        violations
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
