//! Turns agent progress into user-facing display events

use llm_core::{ContentSegment, MessageContent};

use crate::agent::{AgentError, AgentStep};

/// Busy-indicator text while waiting on the model
pub const THINKING: &str = "Thinking...";

/// Something to show the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    /// The submitted user message
    UserEcho(String),
    /// A requested tool began running
    ToolStarted { tool: String, label: String },
    AssistantReasoning(String),
    AssistantText(String),
    Error(String),
}

/// Human label for a tool's activity
pub fn tool_label(name: &str) -> String {
    match name {
        "tavily_search" => "Searching the web".to_string(),
        "calculator" => "Calculating".to_string(),
        "get_current_time" => "Getting current time".to_string(),
        other => format!("Using {}", other),
    }
}

pub fn user_echo(input: &str) -> DisplayEvent {
    DisplayEvent::UserEcho(input.to_string())
}

pub fn error_event(err: &AgentError) -> DisplayEvent {
    DisplayEvent::Error(err.to_string())
}

/// Display events for one agent step
pub fn present(step: &AgentStep) -> Vec<DisplayEvent> {
    match step {
        AgentStep::ModelResponded(message) if message.has_tool_calls() => message
            .tool_calls
            .iter()
            .map(|call| DisplayEvent::ToolStarted {
                tool: call.name.clone(),
                label: tool_label(&call.name),
            })
            .collect(),
        AgentStep::ModelResponded(message) => assistant_events(&message.content),
        AgentStep::ToolFinished { .. } => Vec::new(),
    }
}

/// Reasoning blocks in order, then one body made of every text segment.
/// Content without any text is shown as its JSON form so the turn is never
/// silently empty.
fn assistant_events(content: &MessageContent) -> Vec<DisplayEvent> {
    let mut events = Vec::new();

    if let MessageContent::Segments(segments) = content {
        for segment in segments {
            if let ContentSegment::Reasoning { reasoning } = segment {
                if !reasoning.is_empty() {
                    events.push(DisplayEvent::AssistantReasoning(reasoning.clone()));
                }
            }
        }
    }

    let body = content.text();
    if body.is_empty() {
        let raw = serde_json::to_string(content).unwrap_or_default();
        events.push(DisplayEvent::AssistantText(raw));
    } else {
        events.push(DisplayEvent::AssistantText(body));
    }

    events
}

/// Tracks the busy-indicator text across a turn
#[derive(Debug)]
pub struct Indicator {
    outstanding: usize,
    text: String,
}

impl Indicator {
    pub fn new() -> Self {
        Self {
            outstanding: 0,
            text: THINKING.to_string(),
        }
    }

    #[cfg(test)]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Update for `step`; returns the new text when it changed
    pub fn observe(&mut self, step: &AgentStep) -> Option<&str> {
        let next = match step {
            AgentStep::ModelResponded(message) if message.has_tool_calls() => {
                self.outstanding = message.tool_calls.len();
                let mut labels: Vec<String> = Vec::new();
                for call in &message.tool_calls {
                    let label = tool_label(&call.name);
                    if !labels.contains(&label) {
                        labels.push(label);
                    }
                }
                format!("{}...", labels.join(", "))
            }
            AgentStep::ModelResponded(_) => return None,
            AgentStep::ToolFinished { .. } => {
                self.outstanding = self.outstanding.saturating_sub(1);
                if self.outstanding > 0 {
                    return None;
                }
                THINKING.to_string()
            }
        };

        if next == self.text {
            return None;
        }
        self.text = next;
        Some(&self.text)
    }
}

impl Default for Indicator {
    fn default() -> Self {
        Self::new()
    }
}
