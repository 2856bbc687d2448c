//! Environment configuration
//!
//! Everything comes from the process environment; a `.env` file in the
//! working directory is loaded first if present.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::LlmError;
use crate::openai::DEFAULT_BASE_URL;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant here to serve the user like a loyal servant.";
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Model provider credential (`OPENAI_API_KEY`)
    pub api_key: Option<String>,
    /// API root (`OPENAI_BASE_URL`)
    pub base_url: String,
    /// Chat model (`AGENT_MODEL`)
    pub model: String,
    /// System prompt (`AGENT_SYSTEM_PROMPT`)
    pub system_prompt: String,
    /// Seeded memory note (`AGENT_MEMORY`)
    pub memory: Option<String>,
    /// Tool rounds allowed per user turn (`AGENT_MAX_TOOL_ROUNDS`)
    pub max_tool_rounds: usize,
    /// Search provider credential (`TAVILY_API_KEY`)
    pub search_api_key: Option<String>,
    /// Per-request HTTP timeout (`HTTP_TIMEOUT_SECS`)
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            memory: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            search_api_key: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load `.env` (if any), then read the environment
    pub fn load() -> Self {
        let dotenv = load_dotenv();
        if let Some(ref path) = dotenv {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_env()
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let max_tool_rounds = get("AGENT_MAX_TOOL_ROUNDS")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_tool_rounds);

        let http_timeout = get("HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|n| *n > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        Self {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: get("AGENT_MODEL").unwrap_or(defaults.model),
            system_prompt: get("AGENT_SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
            memory: get("AGENT_MEMORY"),
            max_tool_rounds,
            search_api_key: get("TAVILY_API_KEY"),
            http_timeout,
        }
    }

    /// The model credential; its absence is fatal at startup
    pub fn require_api_key(&self) -> Result<&str, LlmError> {
        self.api_key
            .as_deref()
            .ok_or(LlmError::MissingCredential("OPENAI_API_KEY"))
    }
}

/// Load `.env` from the working directory or a parent, if present
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]);
        assert!(config.api_key.is_none());
        assert!(config.search_api_key.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_tool_rounds, DEFAULT_MAX_TOOL_ROUNDS);
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_parse_env() {
        let config = config_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "https://openrouter.ai/api/v1"),
            ("AGENT_MODEL", "openai/gpt-oss-120b"),
            ("AGENT_MAX_TOOL_ROUNDS", "3"),
            ("TAVILY_API_KEY", "tvly-test"),
            ("AGENT_MEMORY", "- User likes coffee"),
            ("HTTP_TIMEOUT_SECS", "15"),
        ]);
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.model, "openai/gpt-oss-120b");
        assert_eq!(config.max_tool_rounds, 3);
        assert_eq!(config.search_api_key.as_deref(), Some("tvly-test"));
        assert_eq!(config.memory.as_deref(), Some("- User likes coffee"));
        assert_eq!(config.http_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config_from(&[("OPENAI_API_KEY", "  "), ("TAVILY_API_KEY", "")]);
        assert!(config.api_key.is_none());
        assert!(config.search_api_key.is_none());
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[("AGENT_MAX_TOOL_ROUNDS", "0"), ("HTTP_TIMEOUT_SECS", "soon")]);
        assert_eq!(config.max_tool_rounds, DEFAULT_MAX_TOOL_ROUNDS);
        assert_eq!(config.http_timeout, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
    }
}
