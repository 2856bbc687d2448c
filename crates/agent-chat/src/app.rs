//! Wiring shared by the model-backed subcommands

use std::sync::Arc;

use llm_core::{ChatProvider, Config, LlmError, OpenAiClient, TavilyClient};
use tracing::{debug, warn};

use crate::agent::{AgentConfig, AgentLoop};
use crate::tools::builtin::create_default_registry;
use crate::tools::router::ToolRouter;

/// Configuration plus the model provider built from it
pub struct App {
    pub config: Config,
    provider: Arc<dyn ChatProvider>,
}

impl App {
    /// Build the OpenAI-compatible provider; a missing credential is an error
    pub fn from_config(config: Config) -> Result<Self, LlmError> {
        let api_key = config.require_api_key()?;
        let client = OpenAiClient::new(&config.base_url, api_key, config.http_timeout)?;
        debug!(base_url = client.base_url(), model = %config.model, "Model provider ready");

        Ok(Self::with_provider(config, Arc::new(client)))
    }

    pub fn with_provider(config: Config, provider: Arc<dyn ChatProvider>) -> Self {
        Self { config, provider }
    }

    pub fn provider(&self) -> Arc<dyn ChatProvider> {
        Arc::clone(&self.provider)
    }

    pub fn search_enabled(&self) -> bool {
        self.config.search_api_key.is_some()
    }

    /// A fresh agent with the default tools
    pub fn agent(&self) -> AgentLoop {
        let search = self.config.search_api_key.as_deref().and_then(|key| {
            TavilyClient::new(key, self.config.http_timeout)
                .map_err(|e| warn!(error = %e, "Search client unavailable"))
                .ok()
        });

        let registry = create_default_registry(search);
        debug!(tools = registry.len(), "Tool registry ready");
        let router = ToolRouter::new(registry);
        let agent_config = AgentConfig::new(&self.config.model)
            .with_system_prompt(&self.config.system_prompt)
            .with_memory(self.config.memory.clone())
            .with_max_tool_rounds(self.config.max_tool_rounds);

        AgentLoop::new(self.provider(), router, agent_config)
    }
}
