//! Tavily web search client

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::LlmError;

/// Default Tavily API root
pub const TAVILY_BASE_URL: &str = "https://api.tavily.com";

/// One ranked search hit
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Snippet of page content
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Tavily API client
#[derive(Debug, Clone)]
pub struct TavilyClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        Self::with_base_url(TAVILY_BASE_URL, api_key, timeout)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Search the web, returning at most `max_results` ranked hits
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, LlmError> {
        let url = format!("{}/search", self.base_url);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&SearchRequest { query, max_results })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        let mut hits = parsed.results;
        hits.truncate(max_results);
        debug!(hits = hits.len(), "Search completed");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_search_response() {
        let raw = json!({
            "query": "rust",
            "results": [
                {"title": "Rust", "url": "https://www.rust-lang.org", "content": "A language", "score": 0.9},
                {"title": "Docs", "url": "https://doc.rust-lang.org"}
            ]
        });
        let parsed: SearchResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].title, "Rust");
        assert_eq!(parsed.results[1].content, "");
    }

    #[test]
    fn test_missing_results_is_empty() {
        let parsed: SearchResponse = serde_json::from_value(json!({"query": "x"})).unwrap();
        assert!(parsed.results.is_empty());
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(SearchRequest {
            query: "weather",
            max_results: 5,
        })
        .unwrap();
        assert_eq!(body, json!({"query": "weather", "max_results": 5}));
    }
}
