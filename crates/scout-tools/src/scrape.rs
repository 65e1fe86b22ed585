//! Page scrape tool: fetch a URL and extract the readable text content

use anyhow::{Context, Result};
use scout_llm::Tool;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

pub const TOOL_NAME: &str = "scrape_page";

const SCRAPE_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const DEFAULT_MAX_LENGTH: usize = 5000;
const MIN_FRAGMENT_LENGTH: usize = 20;

#[derive(Debug, Deserialize)]
struct ScrapePageInput {
    url: String,
    max_length: Option<usize>,
}

/// Fetches a webpage and extracts the main textual content, skipping
/// navigation, scripts, and other chrome. Best effort for static pages.
pub struct ScrapePageTool {
    client: reqwest::Client,
}

impl ScrapePageTool {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(SCRAPE_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    pub fn definition() -> Tool {
        Tool::new(
            TOOL_NAME,
            "Extract the main text content from a specific webpage. Use only when the user \
             provides a URL to analyze.",
            json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The URL of the webpage to scrape"
                    },
                    "max_length": {
                        "type": "integer",
                        "description": "Maximum length of content to return (default: 5000 chars)",
                        "default": 5000
                    }
                },
                "required": ["url"]
            }),
        )
    }

    pub async fn run(&self, arguments: Value) -> Result<String> {
        let input: ScrapePageInput =
            serde_json::from_value(arguments).context("Invalid scrape_page arguments")?;
        let max_length = input.max_length.unwrap_or(DEFAULT_MAX_LENGTH);

        let parsed = url::Url::parse(&input.url).context("Invalid URL format")?;
        if parsed.host_str().is_none() || !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Invalid URL format: {}", input.url);
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .context("Failed to fetch webpage")?;

        if !response.status().is_success() {
            anyhow::bail!("Webpage returned status {}", response.status());
        }

        let html = response.text().await.context("Webpage body unreadable")?;
        let (title, content) = extract_text_from_html(&html, max_length);

        Ok(json!({
            "status": "success",
            "url": input.url,
            "title": title,
            "content_length": content.len(),
            "content": content
        })
        .to_string())
    }
}

/// Extract title and readable text from an HTML document.
///
/// Prefers `main`/`article`/content containers, falls back to `body`, and
/// collects paragraph and heading text so scripts, styles, and navigation
/// never make it into the output.
fn extract_text_from_html(html: &str, max_length: usize) -> (String, String) {
    use scraper::{Html, Selector};

    let document = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "No title".to_string());

    let content_selectors = [
        "main",
        "article",
        ".content",
        ".main-content",
        ".post-content",
        ".article-content",
        "body",
    ];

    let content_root = content_selectors
        .iter()
        .filter_map(|sel| Selector::parse(sel).ok())
        .find_map(|sel| document.select(&sel).next());

    let text_sel = Selector::parse("p, h1, h2, h3, h4, li").unwrap();

    let mut parts: Vec<String> = Vec::new();
    if let Some(root) = content_root {
        for element in root.select(&text_sel) {
            let text = element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            if text.len() > MIN_FRAGMENT_LENGTH {
                parts.push(text);
            }
        }
    }

    let mut content = parts.join("\n\n");
    if content.len() > max_length {
        content.truncate(truncation_boundary(&content, max_length));
        content.push_str("... [Content truncated]");
    }

    (title, content)
}

/// Largest char boundary at or below `max` so truncation never splits a char
fn truncation_boundary(s: &str, max: usize) -> usize {
    let mut idx = max.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_and_paragraphs() {
        let html = r#"
        <html>
        <head><title>My Article</title></head>
        <body>
            <nav><a href="/">Home navigation link here</a></nav>
            <article>
                <h1>A heading that is long enough</h1>
                <p>This is the first paragraph of the article body.</p>
                <p>short</p>
            </article>
        </body>
        </html>
        "#;
        let (title, content) = extract_text_from_html(html, 5000);
        assert_eq!(title, "My Article");
        assert!(content.contains("A heading that is long enough"));
        assert!(content.contains("first paragraph"));
        // Fragments at or under the minimum length are dropped
        assert!(!content.contains("short"));
    }

    #[test]
    fn prefers_article_over_body_chrome() {
        let html = r#"
        <html><body>
            <footer><p>Footer boilerplate text that is long enough to pass</p></footer>
            <article><p>Actual article content that should be extracted.</p></article>
        </body></html>
        "#;
        let (_, content) = extract_text_from_html(html, 5000);
        assert!(content.contains("Actual article content"));
        assert!(!content.contains("Footer boilerplate"));
    }

    #[test]
    fn truncates_long_content_with_marker() {
        let paragraph = format!("<p>{}</p>", "word ".repeat(200));
        let html = format!("<html><body><article>{}</article></body></html>", paragraph);
        let (_, content) = extract_text_from_html(&html, 100);
        assert!(content.ends_with("... [Content truncated]"));
        assert!(content.len() <= 100 + "... [Content truncated]".len());
    }

    #[test]
    fn missing_title_gets_placeholder() {
        let html = "<html><body><p>Some paragraph content long enough.</p></body></html>";
        let (title, _) = extract_text_from_html(html, 5000);
        assert_eq!(title, "No title");
    }

    #[tokio::test]
    async fn rejects_invalid_url() {
        let tool = ScrapePageTool::new().unwrap();
        let err = tool
            .run(serde_json::json!({"url": "not a url"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[tokio::test]
    async fn rejects_non_http_scheme() {
        let tool = ScrapePageTool::new().unwrap();
        let err = tool
            .run(serde_json::json!({"url": "ftp://example.com/file"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid URL format"));
    }
}
