// Ollama client (HTTP direct against the OpenAI-compatible /v1 endpoint, no SDK)

use crate::traits::{ChatClient, ChatRequest, ChatResponse, TokenUsage};
use crate::types::ToolCall;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Chat client for an Ollama runtime.
///
/// Works against both a local instance (no key) and Ollama Cloud (bearer
/// key), since both expose the OpenAI-compatible `/v1/chat/completions`
/// endpoint.
pub struct OllamaClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a client for a local instance
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::build(base_url.into(), None)
    }

    /// Create a client with an API key (Ollama Cloud)
    pub fn with_api_key(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::build(base_url.into(), Some(api_key.into()))
    }

    /// Create a client against the default local endpoint
    pub fn local() -> Result<Self> {
        Self::build(DEFAULT_BASE_URL.to_string(), None)
    }

    fn build(base_url: String, api_key: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(key) = api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", key))
                    .context("Invalid API key format")?,
            );
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Build the chat completion request payload
fn build_chat_payload(request: &ChatRequest) -> Result<Value> {
    // Message serde already matches the wire format
    let mut payload = serde_json::json!({
        "model": request.model,
        "messages": serde_json::to_value(&request.messages)?,
        "stream": false,
    });

    let obj = payload
        .as_object_mut()
        .expect("payload is always a JSON object");

    let options = &request.options;
    if let Some(temp) = options.temperature {
        obj.insert("temperature".to_string(), serde_json::json!(temp));
    }
    if let Some(max_tokens) = options.max_tokens {
        obj.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
    }
    if let Some(tools) = &options.tools {
        obj.insert("tools".to_string(), serde_json::to_value(tools)?);
    }
    if let Some(tool_choice) = &options.tool_choice {
        obj.insert("tool_choice".to_string(), serde_json::to_value(tool_choice)?);
    }

    Ok(payload)
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
    usage: Option<UsageBody>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: CompletionMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct UsageBody {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = build_chat_payload(&request)?;
        let url = format!("{}/v1/chat/completions", self.base_url);

        tracing::debug!(model = %request.model, messages = request.messages.len(), "Sending chat completion request");

        let response = self
            .http_client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .context("Chat completion request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat completion error ({}): {}", status, body);
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .context("Chat completion returned no choices")?;

        Ok(ChatResponse {
            content: choice.message.content,
            tool_calls: choice.message.tool_calls,
            usage: completion.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}
