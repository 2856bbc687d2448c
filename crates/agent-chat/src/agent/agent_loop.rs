//! Agent loop implementation

use std::sync::Arc;

use llm_core::{ChatMessage, ChatProvider, ChatRequest, TokenUsage};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

use crate::conversation::Conversation;
use crate::tools::router::ToolRouter;
use crate::tools::ToolContext;

use super::state::{AgentConfig, AgentError, AgentState, LoopPhase};

/// Observable progress within one user turn, in order
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStep {
    /// The model produced a turn (with or without tool calls)
    ModelResponded(ChatMessage),
    /// One requested tool finished and its result was recorded
    ToolFinished {
        call_id: String,
        tool: String,
        output: String,
    },
}

/// Summary of a completed user turn
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// Final assistant turn, already appended to the conversation
    pub message: ChatMessage,
    pub tool_rounds: usize,
    pub usage: TokenUsage,
}

/// The agent loop orchestrator
pub struct AgentLoop {
    provider: Arc<dyn ChatProvider>,
    router: ToolRouter,
    config: AgentConfig,
    tool_ctx: ToolContext,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn ChatProvider>, router: ToolRouter, config: AgentConfig) -> Self {
        Self {
            provider,
            router,
            config,
            tool_ctx: ToolContext::default(),
        }
    }

    #[cfg(test)]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Drive the conversation until the model answers without tool calls.
    ///
    /// The caller appends the user turn first. Each model turn and tool
    /// result is appended as it happens and reported on `steps`; a closed
    /// receiver does not stop the loop. On error, turns recorded so far are
    /// kept and the conversation remains well formed.
    #[instrument(skip_all, fields(model = %self.config.model, conversation = %conversation.id))]
    pub async fn run(
        &self,
        conversation: &mut Conversation,
        steps: UnboundedSender<AgentStep>,
    ) -> Result<AgentOutcome, AgentError> {
        info!(
            history = conversation.len(),
            max_tool_rounds = self.config.max_tool_rounds,
            "Starting agent loop"
        );
        let mut state = AgentState::new();
        let tool_defs = self.router.registry().tool_definitions();

        loop {
            debug_assert_eq!(state.phase, LoopPhase::AwaitingModel);

            let mut messages = self.config.preamble();
            messages.extend(conversation.messages().iter().cloned());
            let request =
                ChatRequest::new(&self.config.model, messages).with_tools(tool_defs.clone());

            debug!(
                messages = request.messages.len(),
                provider = self.provider.name(),
                "Calling model"
            );
            let response = self.provider.complete(&request).await.map_err(|e| {
                warn!(error = %e, "Model request failed");
                AgentError::from(e)
            })?;
            state.record_usage(response.usage);

            let mut message = response.message;
            assign_missing_call_ids(&mut message);

            if !message.has_tool_calls() {
                state.phase = LoopPhase::Done;
                info!(
                    tool_rounds = state.tool_rounds,
                    tokens = state.usage.total(),
                    "Agent completed turn"
                );
                conversation.push(message.clone());
                let _ = steps.send(AgentStep::ModelResponded(message.clone()));
                return Ok(AgentOutcome {
                    message,
                    tool_rounds: state.tool_rounds,
                    usage: state.usage,
                });
            }

            if let Some(call) = message
                .tool_calls
                .iter()
                .find(|c| !self.router.registry().contains(&c.name))
            {
                warn!(tool = %call.name, "Model requested unknown tool");
                return Err(AgentError::UnknownTool(call.name.clone()));
            }

            if state.tool_rounds >= self.config.max_tool_rounds {
                warn!(tool_rounds = state.tool_rounds, "Tool round limit reached");
                return Err(AgentError::ToolLoopLimit(state.tool_rounds));
            }

            state.tool_rounds += 1;
            state.phase = LoopPhase::AwaitingTools;
            debug!(
                round = state.tool_rounds,
                tool_count = message.tool_calls.len(),
                "Processing tool calls"
            );

            conversation.push(message.clone());
            let _ = steps.send(AgentStep::ModelResponded(message.clone()));

            let results = self.router.route_all(&message.tool_calls, &self.tool_ctx).await;
            for (call, result) in message.tool_calls.iter().zip(results) {
                let output = result.into_output();
                conversation.push(ChatMessage::tool_result(&call.id, output.clone()));
                let _ = steps.send(AgentStep::ToolFinished {
                    call_id: call.id.clone(),
                    tool: call.name.clone(),
                    output,
                });
            }

            state.phase = LoopPhase::AwaitingModel;
        }
    }
}

/// Providers may omit call ids; results must still pair up one-to-one
fn assign_missing_call_ids(message: &mut ChatMessage) {
    for call in message.tool_calls.iter_mut().filter(|c| c.id.is_empty()) {
        call.id = format!("call_{}", uuid::Uuid::new_v4().simple());
    }
}
