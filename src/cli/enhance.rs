use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

use crate::config::Config;
use crate::llm::factory;
use crate::pipeline::Enhancer;
use crate::render;
use crate::types::{StructuredResult, WorkflowCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => bail!("Unknown output format: {} (expected json or markdown)", other),
        }
    }
}

/// Command-line options for `promptspec enhance`.
#[derive(Debug, Clone, Default)]
pub struct EnhanceOptions {
    pub text: Option<String>,
    pub file: Option<String>,
    pub category: Option<String>,
    pub root: Option<String>,
    pub agents_dir: Option<String>,
    pub config: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub timeout: Option<u64>,
    pub offline: bool,
    pub dry_run: bool,
    pub output: Option<String>,
    pub format: OutputFormat,
}

pub async fn run(options: EnhanceOptions) -> Result<()> {
    let prompt = read_prompt(&options)?;
    let category = options
        .category
        .as_deref()
        .map(WorkflowCategory::from_str)
        .transpose()?;

    // Load config (explicit path, repo root, or user config dir)
    let mut config = Config::load_with_path(options.config.clone())?;
    apply_overrides(&mut config, &options);

    let mut enhancer = Enhancer::from_config(&config);
    if options.offline {
        info!("Offline mode: using fallback enhancement only");
    } else {
        match factory::create_client(&config, options.dry_run) {
            Ok(client) => enhancer = enhancer.with_client(client),
            Err(e) => warn!("No model available ({:#}); continuing offline", e),
        }
    }

    let result = enhancer.enhance(&prompt, category).await?;
    let rendered = render_result(&result, options.format)?;

    match &options.output {
        Some(path) => {
            fs::write(path, &rendered).with_context(|| format!("Failed to write {}", path))?;
            info!("Wrote {}", path);
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn read_prompt(options: &EnhanceOptions) -> Result<String> {
    let prompt = match (&options.text, &options.file) {
        (Some(_), Some(_)) => bail!("Pass either TEXT or --file, not both"),
        (Some(text), None) => text.clone(),
        (None, Some(path)) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
        }
        (None, None) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read prompt from stdin")?;
            buffer
        }
    };
    Ok(prompt)
}

fn apply_overrides(config: &mut Config, options: &EnhanceOptions) {
    if let Some(ref root) = options.root {
        info!("CLI override: root = {}", root);
        config.enhancement.root = PathBuf::from(root);
    }
    if let Some(ref dir) = options.agents_dir {
        info!("CLI override: agents_dir = {}", dir);
        config.enhancement.agents_dir = PathBuf::from(dir);
    }
    if let Some(ref provider) = options.provider {
        info!("CLI override: provider = {}", provider);
        config.llm.provider = provider.clone();
    }
    if let Some(ref model) = options.model {
        info!("CLI override: model = {}", model);
        config.llm.model = model.clone();
    }
    if let Some(timeout) = options.timeout {
        info!("CLI override: timeout_secs = {}", timeout);
        config.llm.timeout_secs = timeout;
    }
}

pub fn render_result(result: &StructuredResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(result).context("Failed to serialize result")
        }
        OutputFormat::Markdown => Ok(render::to_markdown(result)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::from_str("MD").unwrap(), OutputFormat::Markdown);
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("yaml").is_err());
    }

    #[test]
    fn test_read_prompt_conflict() {
        let options = EnhanceOptions {
            text: Some("a".to_string()),
            file: Some("b".to_string()),
            ..EnhanceOptions::default()
        };
        assert!(read_prompt(&options).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        let options = EnhanceOptions {
            root: Some("/srv/app".to_string()),
            provider: Some("openai".to_string()),
            timeout: Some(5),
            ..EnhanceOptions::default()
        };
        apply_overrides(&mut config, &options);
        assert_eq!(config.enhancement.root, PathBuf::from("/srv/app"));
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.timeout_secs, 5);
    }

    #[tokio::test]
    async fn test_run_offline_writes_markdown() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("task.md");
        let options = EnhanceOptions {
            text: Some("the checkout page is broken".to_string()),
            root: Some(tmp.path().to_string_lossy().into_owned()),
            config: None,
            offline: true,
            output: Some(out.to_string_lossy().into_owned()),
            format: OutputFormat::Markdown,
            ..EnhanceOptions::default()
        };
        run(options).await.unwrap();
        let md = std::fs::read_to_string(&out).unwrap();
        assert!(md.contains("category: bug"));
        assert!(md.contains("source: fallback"));
    }

    #[tokio::test]
    async fn test_run_rejects_empty_prompt() {
        let tmp = TempDir::new().unwrap();
        let options = EnhanceOptions {
            text: Some("   ".to_string()),
            root: Some(tmp.path().to_string_lossy().into_owned()),
            offline: true,
            ..EnhanceOptions::default()
        };
        let err = run(options).await.unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
