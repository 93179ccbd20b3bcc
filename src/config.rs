use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::context::ContextOptions;
use crate::llm::factory::Provider;

pub const CONFIG_FILE_NAME: &str = "promptspec.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub enhancement: EnhancementConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "anthropic", "openai" or "openai-compatible"
    pub provider: String,
    pub model: String,
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>, // For OpenAI-compatible APIs

    /// Optional: Override max_tokens for LLM requests
    /// If not specified, uses provider-specific defaults:
    /// - anthropic: 4096
    /// - openai: 4096
    /// - openai-compatible (ollama): 16384
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Deadline for one generation call; past it the fallback takes over
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: Some("AI_API_KEY".to_string()),
            base_url: None,
            max_tokens: None, // Use provider default (4096 for anthropic)
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Configured `max_tokens`, else the provider's default.
    pub fn get_max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or_else(|| {
            Provider::from_str(&self.provider)
                .map(|p| p.default_max_tokens())
                .unwrap_or(4096)
        })
    }

    fn is_local(&self) -> bool {
        Provider::from_str(&self.provider).is_ok_and(|p| p == Provider::OpenAiCompatible)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementConfig {
    /// Project root scanned for relevant files and manifests
    pub root: PathBuf,
    /// Agent identity documents, relative to `root` unless absolute
    pub agents_dir: PathBuf,
    pub max_files: usize,
    pub display_files: usize,
    pub max_file_bytes: u64,
    /// Entries per bounded cache (context and agent catalogs)
    pub cache_capacity: u64,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        let context = ContextOptions::default();
        Self {
            root: PathBuf::from("."),
            agents_dir: PathBuf::from(".claude/agents"),
            max_files: context.max_files,
            display_files: context.display_files,
            max_file_bytes: context.max_file_bytes,
            cache_capacity: crate::cache::DEFAULT_CAPACITY,
        }
    }
}

impl EnhancementConfig {
    pub fn context_options(&self) -> ContextOptions {
        ContextOptions {
            max_files: self.max_files,
            display_files: self.display_files.min(self.max_files),
            max_file_bytes: self.max_file_bytes,
        }
    }

    pub fn resolved_agents_dir(&self) -> PathBuf {
        if self.agents_dir.is_absolute() {
            self.agents_dir.clone()
        } else {
            self.root.join(&self.agents_dir)
        }
    }
}

impl Config {
    /// Load config from repo root or user config directory
    pub fn load() -> Result<Self> {
        Self::load_with_path(None)
    }

    /// Load configuration from a specific path, or use default search paths
    pub fn load_with_path(path: Option<String>) -> Result<Self> {
        // An explicit path must exist and parse
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path);
            return Self::load_from_path(&config_path)
                .with_context(|| format!("Failed to load config from {}", config_path));
        }

        // Try repo root first (per-repo config)
        if let Ok(config) = Self::load_from_path(CONFIG_FILE_NAME) {
            debug!("Loaded config from ./{}", CONFIG_FILE_NAME);
            return Ok(config);
        }

        // Try user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("promptspec").join("config.toml");
            if let Ok(config) = Self::load_from_path(&config_path) {
                debug!("Loaded config from {:?}", config_path);
                return Ok(config);
            }
        }

        debug!("Using default config");
        Ok(Self::default())
    }

    fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get API key from environment variable specified in config
    pub fn get_api_key(&self) -> Result<String> {
        match &self.llm.api_key_env {
            Some(env_var) => {
                // Special case: "none" means no API key needed (e.g., Ollama)
                if env_var.to_lowercase() == "none" {
                    return Ok(String::new());
                }

                // Local servers usually run keyless; gateways in front of them don't
                if self.llm.is_local() {
                    return Ok(env::var(env_var).unwrap_or_default());
                }

                env::var(env_var).map_err(|_| {
                    anyhow::anyhow!("API key not found in environment variable: {}", env_var)
                })
            }
            None => Ok(String::new()),
        }
    }
}
