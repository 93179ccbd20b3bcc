use anyhow::Result;
use clap::{Parser, Subcommand};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

use promptspec::cli;
use promptspec::cli::enhance::{EnhanceOptions, OutputFormat};

#[derive(Parser)]
#[command(name = "promptspec", version)]
#[command(about = "Turn rough task prompts into structured, scored specifications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enhance a prompt into a structured task specification
    Enhance {
        /// Prompt text (read from --file or stdin when omitted)
        text: Option<String>,

        /// Read the prompt from a file
        #[arg(short = 'f', long)]
        file: Option<String>,

        /// Force a workflow category (bug, feature, refactor, docs, ...)
        #[arg(short = 'c', long)]
        category: Option<String>,

        /// Project root to gather context from (default: from config, else ".")
        #[arg(long)]
        root: Option<String>,

        /// Directory of agent identity documents
        #[arg(long)]
        agents_dir: Option<String>,

        /// Path to config file (defaults to ./promptspec.toml or ~/.config/promptspec/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// Override LLM provider (anthropic, openai, openai-compatible)
        #[arg(long)]
        provider: Option<String>,

        /// Override LLM model
        #[arg(long)]
        model: Option<String>,

        /// Generation deadline in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Skip the model entirely and use the offline fallback
        #[arg(long)]
        offline: bool,

        /// Use mock LLM client for testing
        #[arg(long)]
        dry_run: bool,

        /// Write the result to a file instead of stdout
        #[arg(short = 'o', long)]
        output: Option<String>,

        /// Output format: json or markdown
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Re-validate a stored result (JSON) and print its issues
    Validate {
        /// Path to the result file
        path: String,
    },

    /// Print the workflow category of a prompt and the per-category scores
    Classify {
        /// Prompt text
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Enhance {
            text,
            file,
            category,
            root,
            agents_dir,
            config,
            provider,
            model,
            timeout,
            offline,
            dry_run,
            output,
            format,
        } => {
            let options = EnhanceOptions {
                text,
                file,
                category,
                root,
                agents_dir,
                config,
                provider,
                model,
                timeout,
                offline,
                dry_run,
                output,
                format: OutputFormat::from_str(&format)?,
            };
            cli::enhance::run(options).await?;
        }
        Commands::Validate { path } => {
            cli::validate::run(&path)?;
        }
        Commands::Classify { text } => {
            cli::classify::run(&text)?;
        }
    }

    Ok(())
}
