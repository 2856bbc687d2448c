//! Agent framework: the model/tool loop for one user turn

mod agent_loop;
mod state;
#[cfg(test)]
pub(crate) mod testing;

pub use agent_loop::{AgentLoop, AgentOutcome, AgentStep};
pub use state::{AgentConfig, AgentError};
