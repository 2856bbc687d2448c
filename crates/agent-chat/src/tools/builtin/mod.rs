//! Built-in tools for the agent framework

mod calculator;
mod current_time;
mod web_search;

pub use calculator::CalculatorTool;
pub use current_time::CurrentTimeTool;
pub use web_search::WebSearchTool;

#[cfg(test)]
pub use web_search::SEARCH_NOT_CONFIGURED;

use llm_core::TavilyClient;

use super::registry::ToolRegistry;

/// Create a registry with all default tools
///
/// Search stays registered without a client so the model gets an explanatory
/// result instead of an unknown-tool failure.
pub fn create_default_registry(search: Option<TavilyClient>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(CalculatorTool);
    registry.register(CurrentTimeTool);
    registry.register(WebSearchTool::new(search));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_tools() {
        let registry = create_default_registry(None);
        assert_eq!(
            registry.list_names(),
            vec!["calculator", "get_current_time", "tavily_search"]
        );
    }
}
