//! Web search tool backed by the DuckDuckGo HTML endpoint (free, no API key)

use anyhow::{Context, Result};
use scout_llm::Tool;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

pub const TOOL_NAME: &str = "web_search";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const MAX_RESULTS: usize = 10;

#[derive(Debug, Deserialize)]
struct WebSearchInput {
    query: String,
    num_results: Option<usize>,
}

/// Searches the web and returns titles, URLs, and snippets as a JSON string
/// the model can read back.
pub struct WebSearchTool {
    client: reqwest::Client,
}

impl WebSearchTool {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    pub fn definition() -> Tool {
        Tool::new(
            TOOL_NAME,
            "Search the web for current information on a topic. Returns titles, URLs, and \
             snippets. Use for recent events, statistics, and comparisons.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    },
                    "num_results": {
                        "type": "integer",
                        "description": "Number of results to return (default: 5, max: 10)",
                        "default": 5
                    }
                },
                "required": ["query"]
            }),
        )
    }

    pub async fn run(&self, arguments: Value) -> Result<String> {
        let input: WebSearchInput =
            serde_json::from_value(arguments).context("Invalid web_search arguments")?;
        let num = input.num_results.unwrap_or(5).min(MAX_RESULTS);

        let url = format!(
            "https://html.duckduckgo.com/html/?q={}",
            urlencoding::encode(&input.query)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Search request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Search returned status {}", response.status());
        }

        let html = response.text().await.context("Search response unreadable")?;
        let results = parse_duckduckgo_html(&html, num);

        if results.is_empty() {
            return Ok(json!({
                "status": "no_results",
                "message": format!("No results found for query: {}", input.query),
                "results": []
            })
            .to_string());
        }

        Ok(json!({
            "status": "success",
            "query": input.query,
            "count": results.len(),
            "results": results
        })
        .to_string())
    }
}

/// Parse the DuckDuckGo HTML results page
fn parse_duckduckgo_html(html: &str, max_results: usize) -> Vec<Value> {
    use scraper::{Html, Selector};

    let document = Html::parse_document(html);
    let mut results = Vec::new();

    // The HTML endpoint uses .result for each hit
    let result_sel = Selector::parse(".result").unwrap();
    let link_sel = Selector::parse(".result__a").unwrap();
    let snippet_sel = Selector::parse(".result__snippet").unwrap();

    for element in document.select(&result_sel).take(max_results) {
        let title = element
            .select(&link_sel)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default()
            .trim()
            .to_string();

        let raw_url = element
            .select(&link_sel)
            .next()
            .and_then(|el| el.value().attr("href"))
            .unwrap_or("");
        let url = normalize_duckduckgo_url(raw_url);

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default()
            .trim()
            .to_string();

        if !title.is_empty() && !url.is_empty() {
            results.push(json!({
                "id": results.len() + 1,
                "title": title,
                "url": url,
                "snippet": if snippet.is_empty() { "No description available".to_string() } else { snippet }
            }));
        }
    }

    results
}

/// Normalize DuckDuckGo tracking links to the destination URL.
///
/// Results often come back as
/// `https://duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com`.
fn normalize_duckduckgo_url(raw_url: &str) -> String {
    let Ok(parsed) = url::Url::parse(raw_url) else {
        return raw_url.to_string();
    };

    if parsed.domain() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
        for (key, value) in parsed.query_pairs() {
            if key == "uddg" {
                return value.into_owned();
            }
        }
    }

    raw_url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_page() {
        let html = "<html><body></body></html>";
        assert!(parse_duckduckgo_html(html, 5).is_empty());
    }

    #[test]
    fn parse_page_with_results() {
        let html = r#"
        <html><body>
            <div class="result">
                <a class="result__a" href="https://example.com">Example Title</a>
                <a class="result__snippet">This is a snippet about example.</a>
            </div>
            <div class="result">
                <a class="result__a" href="https://test.com">Test Title</a>
                <a class="result__snippet">This is a test snippet.</a>
            </div>
        </body></html>
        "#;
        let results = parse_duckduckgo_html(html, 5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["id"], 1);
        assert_eq!(results[0]["title"], "Example Title");
        assert_eq!(results[0]["url"], "https://example.com");
        assert_eq!(results[1]["id"], 2);
    }

    #[test]
    fn parse_respects_limit() {
        let html = r#"
        <html><body>
            <div class="result"><a class="result__a" href="https://a.com">A</a></div>
            <div class="result"><a class="result__a" href="https://b.com">B</a></div>
            <div class="result"><a class="result__a" href="https://c.com">C</a></div>
        </body></html>
        "#;
        assert_eq!(parse_duckduckgo_html(html, 2).len(), 2);
    }

    #[test]
    fn parse_decodes_redirect_url() {
        let html = r#"
        <html><body>
            <div class="result">
                <a class="result__a" href="https://duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpost">Example</a>
            </div>
        </body></html>
        "#;
        let results = parse_duckduckgo_html(html, 1);
        assert_eq!(results[0]["url"], "https://example.com/post");
    }

    #[test]
    fn missing_snippet_gets_placeholder() {
        let html = r#"
        <html><body>
            <div class="result">
                <a class="result__a" href="https://example.com">Example</a>
            </div>
        </body></html>
        "#;
        let results = parse_duckduckgo_html(html, 1);
        assert_eq!(results[0]["snippet"], "No description available");
    }
}
