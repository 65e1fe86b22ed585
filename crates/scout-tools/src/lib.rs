pub mod failure;
pub mod scrape;
pub mod search;

use anyhow::Result;
use async_trait::async_trait;
use scout_llm::Tool;
use serde_json::Value;

pub use failure::{format_tool_error, FailureKind};
pub use scrape::ScrapePageTool;
pub use search::WebSearchTool;

/// Trait for executing tools by name
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, tool_name: &str, arguments: Value) -> Result<String>;

    /// Definitions advertised to the model
    fn tool_definitions(&self) -> Vec<Tool>;
}

/// The two research tools bound to the agent: web search and page scrape.
pub struct ResearchToolkit {
    search: WebSearchTool,
    scrape: ScrapePageTool,
}

impl ResearchToolkit {
    pub fn new() -> Result<Self> {
        Ok(Self {
            search: WebSearchTool::new()?,
            scrape: ScrapePageTool::new()?,
        })
    }
}

#[async_trait]
impl ToolExecutor for ResearchToolkit {
    async fn execute(&self, tool_name: &str, arguments: Value) -> Result<String> {
        match tool_name {
            search::TOOL_NAME => self.search.run(arguments).await,
            scrape::TOOL_NAME => self.scrape.run(arguments).await,
            _ => anyhow::bail!("Unknown tool: {}", tool_name),
        }
    }

    fn tool_definitions(&self) -> Vec<Tool> {
        vec![WebSearchTool::definition(), ScrapePageTool::definition()]
    }
}
