//! HTTP clients for the hosted chat APIs. Both speak plain text in and out;
//! the structured layer above them owns prompt framing and JSON parsing.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::client::LlmClient;
use crate::util::SecretString;

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const ANTHROPIC_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str =
    "You turn rough software task requests into precise task specifications. You answer with JSON only.";

/// Structured output wants little creativity
const TEMPERATURE: f32 = 0.2;

/// Connection settings shared by every provider.
struct Endpoint {
    api_key: SecretString,
    model: String,
    base_url: String,
    max_tokens: u32,
    http: Client,
}

impl Endpoint {
    fn new(
        api_key: String,
        model: String,
        base_url: String,
        max_tokens: u32,
        timeout_secs: u64,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            api_key: api_key.into(),
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_tokens,
            http,
        })
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(format!("{}/{}", self.base_url, path))
            .header("content-type", "application/json")
    }

    /// Local servers run without a key; "none" is the conventional placeholder.
    fn has_key(&self) -> bool {
        let key = self.api_key.expose();
        !key.is_empty() && !key.eq_ignore_ascii_case("none")
    }
}

/// Send `request` and decode a successful JSON body. Non-2xx replies become
/// errors carrying the status and body text.
async fn send<T: DeserializeOwned>(provider: &str, request: RequestBuilder) -> Result<T> {
    let response = request
        .send()
        .await
        .with_context(|| format!("Failed to send request to {} API", provider))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("{} API error {}: {}", provider, status, body);
    }

    response
        .json()
        .await
        .with_context(|| format!("Failed to parse {} API response", provider))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

// Anthropic

pub struct AnthropicClient {
    endpoint: Endpoint,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

impl MessagesResponse {
    /// Text of the first text block. Tool-use and thinking blocks are skipped.
    fn into_text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|block| block.kind.is_empty() || block.kind == "text")
            .map(|block| block.text)
    }
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String, max_tokens: u32, timeout_secs: u64) -> Result<Self> {
        Self::with_base_url(
            api_key,
            model,
            ANTHROPIC_BASE_URL.to_string(),
            max_tokens,
            timeout_secs,
        )
    }

    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: String,
        max_tokens: u32,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::new(api_key, model, base_url, max_tokens, timeout_secs)?,
        })
    }

    fn build_request(&self, prompt: &str) -> MessagesRequest {
        MessagesRequest {
            model: self.endpoint.model.clone(),
            max_tokens: self.endpoint.max_tokens,
            system: SYSTEM_PROMPT.to_string(),
            temperature: TEMPERATURE,
            messages: vec![ChatMessage::new("user", prompt)],
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let endpoint = &self.endpoint;
        debug!("Anthropic request: model {}", endpoint.model);

        let request = endpoint
            .post("messages")
            .header("x-api-key", endpoint.api_key.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.build_request(prompt));

        let reply: MessagesResponse = send("Anthropic", request).await?;
        reply.into_text().context("No text content in Anthropic response")
    }
}

// OpenAI and OpenAI-compatible servers

pub struct OpenAIClient {
    endpoint: Endpoint,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl OpenAIClient {
    pub fn new(api_key: String, model: String, max_tokens: u32, timeout_secs: u64) -> Result<Self> {
        Self::with_base_url(
            api_key,
            model,
            OPENAI_BASE_URL.to_string(),
            max_tokens,
            timeout_secs,
        )
    }

    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: String,
        max_tokens: u32,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::new(api_key, model, base_url, max_tokens, timeout_secs)?,
        })
    }

    fn build_request(&self, prompt: &str) -> ChatRequest {
        let limit = self.endpoint.max_tokens;
        // gpt-5 and later reject max_tokens
        let (max_tokens, max_completion_tokens) = if self.endpoint.model.starts_with("gpt-5") {
            (None, Some(limit))
        } else {
            (Some(limit), None)
        };

        ChatRequest {
            model: self.endpoint.model.clone(),
            messages: vec![
                ChatMessage::new("system", SYSTEM_PROMPT),
                ChatMessage::new("user", prompt),
            ],
            temperature: TEMPERATURE,
            max_tokens,
            max_completion_tokens,
        }
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let endpoint = &self.endpoint;
        debug!(
            "OpenAI-compatible request to {}: model {}",
            endpoint.base_url, endpoint.model
        );

        let mut request = endpoint
            .post("chat/completions")
            .json(&self.build_request(prompt));
        if endpoint.has_key() {
            request = request.header("authorization", format!("Bearer {}", endpoint.api_key.expose()));
        }

        let reply: ChatResponse = send("OpenAI", request).await?;
        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("No choices in OpenAI response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_defaults() {
        let client =
            AnthropicClient::new("test_key".to_string(), "claude-3".to_string(), 4096, 120)
                .unwrap();
        assert_eq!(client.endpoint.api_key.expose(), "test_key");
        assert_eq!(client.endpoint.base_url, ANTHROPIC_BASE_URL);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OpenAIClient::with_base_url(
            "none".to_string(),
            "llama3".to_string(),
            "http://localhost:11434/v1/".to_string(),
            16384,
            120,
        )
        .unwrap();
        assert_eq!(client.endpoint.base_url, "http://localhost:11434/v1");
        assert!(!client.endpoint.has_key());
    }

    #[test]
    fn test_anthropic_request_carries_system_prompt() {
        let client =
            AnthropicClient::new("k".to_string(), "claude-3".to_string(), 2048, 30).unwrap();
        let json = serde_json::to_value(client.build_request("test")).unwrap();
        assert_eq!(json["max_tokens"], 2048);
        assert!(json["system"].as_str().unwrap().contains("JSON"));
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "test");
    }

    #[test]
    fn test_gpt5_uses_max_completion_tokens() {
        let client =
            OpenAIClient::new("k".to_string(), "gpt-5-turbo".to_string(), 4096, 120).unwrap();
        let json = serde_json::to_value(client.build_request("test")).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["max_completion_tokens"], 4096);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "test");
    }

    #[test]
    fn test_older_models_use_max_tokens() {
        let client = OpenAIClient::new("k".to_string(), "gpt-4o".to_string(), 4096, 120).unwrap();
        let json = serde_json::to_value(client.build_request("test")).unwrap();
        assert_eq!(json["max_tokens"], 4096);
        assert!(json.get("max_completion_tokens").is_none());
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 0.0001);
    }

    #[test]
    fn test_anthropic_skips_non_text_blocks() {
        let json = r#"{
            "content": [
                {"type": "thinking", "text": ""},
                {"type": "text", "text": "Hello, world!"}
            ]
        }"#;
        let response: MessagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_text().as_deref(), Some("Hello, world!"));

        let empty: MessagesResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(empty.into_text().is_none());
    }

    #[test]
    fn test_openai_response_parsing() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": "Hi"}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "Hi");
    }
}
