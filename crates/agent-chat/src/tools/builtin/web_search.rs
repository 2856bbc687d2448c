//! Web search tool backed by Tavily

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use llm_core::{SearchHit, TavilyClient};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::tools::{ParameterProperty, ParameterSchema, Tool, ToolContext, ToolResult};

/// Returned to the model when no search credential is configured
pub const SEARCH_NOT_CONFIGURED: &str =
    "Error: TAVILY_API_KEY not configured. Cannot perform web search.";

/// Number of hits reported back to the model
pub const MAX_RESULTS: usize = 5;

/// Tool for searching the web
pub struct WebSearchTool {
    client: Option<TavilyClient>,
}

impl WebSearchTool {
    /// `None` leaves the tool advertised but reporting the missing credential
    pub fn new(client: Option<TavilyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "tavily_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information. Returns titles, URLs and snippets of the top results."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        ParameterSchema::new().with_required("query", ParameterProperty::string("The search query"))
    }

    #[instrument(skip(self, args, _ctx), fields(query = tracing::field::Empty))]
    async fn execute(&self, args: &Value, _ctx: &ToolContext) -> Result<ToolResult> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing required parameter: query"))?;

        let preview: String = query.chars().take(50).collect();
        tracing::Span::current().record("query", preview.as_str());

        let Some(client) = &self.client else {
            warn!("Search requested without TAVILY_API_KEY");
            return Ok(ToolResult::error(SEARCH_NOT_CONFIGURED));
        };

        match client.search(query, MAX_RESULTS).await {
            Ok(hits) => {
                debug!(hits = hits.len(), "Search finished");
                Ok(ToolResult::success(format_results(query, &hits)))
            }
            Err(e) => {
                warn!(error = %e, "Search request failed");
                Ok(ToolResult::error(format!("Error: web search failed: {}", e)))
            }
        }
    }
}

/// Numbered listing of hits, or a no-results line
pub fn format_results(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results found for query: \"{}\"", query);
    }

    let entries: Vec<String> = hits
        .iter()
        .take(MAX_RESULTS)
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. {}\n   URL: {}\n   {}",
                i + 1,
                hit.title,
                hit.url,
                hit.content
            )
        })
        .collect();

    format!("Search results for \"{}\":\n\n{}", query, entries.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(title: &str, url: &str, content: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            url: url.to_string(),
            content: content.to_string(),
            score: 0.5,
        }
    }

    #[tokio::test]
    async fn test_missing_key_reports_literal() {
        let tool = WebSearchTool::new(None);
        let result = tool
            .execute(&json!({"query": "weather in Paris"}), &ToolContext::default())
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.into_text(), SEARCH_NOT_CONFIGURED);
    }

    #[test]
    fn test_format_results() {
        let hits = vec![
            hit("Rust", "https://www.rust-lang.org", "A language"),
            hit("Docs", "https://doc.rust-lang.org", "Reference"),
        ];
        assert_eq!(
            format_results("rust", &hits),
            "Search results for \"rust\":\n\n\
             1. Rust\n   URL: https://www.rust-lang.org\n   A language\n\n\
             2. Docs\n   URL: https://doc.rust-lang.org\n   Reference"
        );
    }

    #[test]
    fn test_format_no_results() {
        assert_eq!(format_results("zzz", &[]), "No results found for query: \"zzz\"");
    }

    #[test]
    fn test_format_caps_at_max_results() {
        let hits: Vec<_> = (0..8).map(|i| hit(&format!("t{}", i), "u", "c")).collect();
        let text = format_results("q", &hits);
        assert!(text.contains("5. t4"));
        assert!(!text.contains("6. t5"));
    }
}
