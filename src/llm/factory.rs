use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use super::client::{LlmClient, MockLlmClient};
use super::client_impl::{AnthropicClient, OpenAIClient};
use crate::config::Config;

pub const DEFAULT_COMPATIBLE_BASE_URL: &str = "http://localhost:11434/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAi,
    /// Ollama, vLLM, LiteLLM and other servers speaking the chat-completions API
    OpenAiCompatible,
}

impl Provider {
    pub fn default_max_tokens(&self) -> u32 {
        match self {
            Provider::Anthropic | Provider::OpenAi => 4096,
            Provider::OpenAiCompatible => 16384,
        }
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAi),
            "openai-compatible" | "ollama" => Ok(Provider::OpenAiCompatible),
            other => bail!("Unknown LLM provider: {}", other),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::OpenAi => write!(f, "openai"),
            Provider::OpenAiCompatible => write!(f, "openai-compatible"),
        }
    }
}

/// Build the client named by `config.llm`. `dry_run` short-circuits to the
/// offline mock without touching keys or the network.
pub fn create_client(config: &Config, dry_run: bool) -> Result<Arc<dyn LlmClient>> {
    if dry_run {
        debug!("Dry run: using mock LLM client");
        return Ok(Arc::new(MockLlmClient::new()));
    }

    let llm = &config.llm;
    let provider = Provider::from_str(&llm.provider)?;
    let api_key = config.get_api_key()?;
    let model = llm.model.clone();
    let max_tokens = llm.get_max_tokens();
    debug!("Creating {} client for model {}", provider, model);

    let client: Arc<dyn LlmClient> = match provider {
        Provider::Anthropic => {
            let base_url = llm
                .base_url
                .clone()
                .unwrap_or_else(|| super::client_impl::ANTHROPIC_BASE_URL.to_string());
            Arc::new(AnthropicClient::with_base_url(
                api_key,
                model,
                base_url,
                max_tokens,
                llm.timeout_secs,
            )?)
        }
        Provider::OpenAi => Arc::new(OpenAIClient::new(
            api_key,
            model,
            max_tokens,
            llm.timeout_secs,
        )?),
        Provider::OpenAiCompatible => {
            let base_url = llm
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_COMPATIBLE_BASE_URL.to_string());
            Arc::new(OpenAIClient::with_base_url(
                api_key,
                model,
                base_url,
                max_tokens,
                llm.timeout_secs,
            )?)
        }
    };
    Ok(client)
}
