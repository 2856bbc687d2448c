//! Tool routing and dispatch

use futures::future::join_all;
use llm_core::ToolCall;
use tracing::{debug, info, instrument, warn};

use super::registry::ToolRegistry;
use super::{ToolContext, ToolResult};

/// Suffix appended to error results so the model retries with corrected input
const RETRY_HINT: &str = "\n Please fix your mistakes.";

/// Result of routing a tool call
#[derive(Debug)]
pub enum RouteResult {
    /// Tool ran; it may still report a failure through its result
    Success(ToolResult),
    /// Arguments did not match the tool's schema
    Invalid(String),
    /// Tool not found
    NotFound(String),
    /// Error during execution
    Error(String),
}

impl RouteResult {
    /// Text recorded as the tool-result turn
    pub fn into_output(self) -> String {
        match self {
            RouteResult::Success(result) => result.into_text(),
            RouteResult::Invalid(reason) => {
                format!("Error: invalid arguments: {}{}", reason, RETRY_HINT)
            }
            RouteResult::NotFound(name) => {
                format!("Error: {} is not a valid tool, try one of the available tools.", name)
            }
            RouteResult::Error(e) => format!("Error: {}{}", e, RETRY_HINT),
        }
    }
}

/// Router for dispatching tool calls
pub struct ToolRouter {
    registry: ToolRegistry,
}

impl ToolRouter {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Route a single tool call: look up, validate, then execute
    #[instrument(skip(self, ctx), fields(tool = %tool_call.name, call_id = %tool_call.id))]
    pub async fn route(&self, tool_call: &ToolCall, ctx: &ToolContext) -> RouteResult {
        let tool = match self.registry.get(&tool_call.name) {
            Some(t) => t,
            None => {
                warn!(tool = %tool_call.name, "Tool not found");
                return RouteResult::NotFound(tool_call.name.clone());
            }
        };

        if let Err(reason) = tool.parameters_schema().validate(&tool_call.arguments) {
            warn!(tool = %tool_call.name, %reason, "Rejected tool arguments");
            return RouteResult::Invalid(reason);
        }

        info!(tool = %tool_call.name, "Executing tool");
        match tool.execute(&tool_call.arguments, ctx).await {
            Ok(mut result) => {
                if result.success {
                    debug!(output_len = result.output.len(), "Tool executed successfully");
                    truncate_output(&mut result.output, ctx.max_output_len);
                } else {
                    warn!(error = ?result.error, "Tool reported failure");
                }
                RouteResult::Success(result)
            }
            Err(e) => {
                warn!(error = %e, "Tool execution error");
                RouteResult::Error(e.to_string())
            }
        }
    }

    /// Route a batch of calls concurrently; results keep request order
    pub async fn route_all(&self, tool_calls: &[ToolCall], ctx: &ToolContext) -> Vec<RouteResult> {
        join_all(tool_calls.iter().map(|call| self.route(call, ctx))).await
    }

    /// Get a reference to the registry
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

impl std::fmt::Debug for ToolRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRouter")
            .field("registry", &self.registry)
            .finish()
    }
}

fn truncate_output(output: &mut String, max_len: usize) {
    if output.len() <= max_len {
        return;
    }
    let mut cut = max_len;
    while !output.is_char_boundary(cut) {
        cut -= 1;
    }
    output.truncate(cut);
    output.push_str("\n...[output truncated]");
}
