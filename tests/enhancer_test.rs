//! End-to-end enhancement: model path, fallback path and degradation

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use promptspec::llm::client::{LlmClient, MockLlmClient};
use promptspec::types::{EnhancementSource, InputMetadata};
use promptspec::{EnhanceError, Enhancer, RawInput, WorkflowCategory};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct FailingClient;

#[async_trait]
impl LlmClient for FailingClient {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("connection refused"))
    }
}

struct SlowClient;

#[async_trait]
impl LlmClient for SlowClient {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(r#"{"instruction": "too late"}"#.to_string())
    }
}

struct GarbageClient;

#[async_trait]
impl LlmClient for GarbageClient {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok("Sure! Here is your specification: it's great.".to_string())
    }
}

const PROMPTS: &[&str] = &[
    "fix",
    "the checkout page is broken on mobile",
    "I need to export reports as csv",
    "refactor the billing module",
    "write docs for the public api",
    "we should think about caching at some point, maybe redis, not sure",
    "???",
];

#[tokio::test]
async fn test_failing_model_falls_back() {
    let tmp = TempDir::new().unwrap();
    let enhancer = Enhancer::new(tmp.path()).with_client(Arc::new(FailingClient));

    let result = enhancer
        .enhance("the login form is not working", None)
        .await
        .unwrap();
    assert_eq!(result.source, EnhancementSource::Fallback);
    assert_eq!(result.confidence_score, 50);
    assert!(!result.instruction.is_empty());
}

#[tokio::test]
async fn test_slow_model_times_out_into_fallback() {
    let tmp = TempDir::new().unwrap();
    let enhancer = Enhancer::new(tmp.path())
        .with_client(Arc::new(SlowClient))
        .with_timeout(Duration::from_millis(50));

    let result = enhancer.enhance("add a logout button", None).await.unwrap();
    assert_eq!(result.source, EnhancementSource::Fallback);
    assert_eq!(result.confidence_score, 50);
}

#[tokio::test]
async fn test_malformed_reply_falls_back() {
    let tmp = TempDir::new().unwrap();
    let enhancer = Enhancer::new(tmp.path()).with_client(Arc::new(GarbageClient));

    let result = enhancer.enhance("add a logout button", None).await.unwrap();
    assert_eq!(result.source, EnhancementSource::Fallback);
}

#[tokio::test]
async fn test_model_path() {
    let tmp = TempDir::new().unwrap();
    let enhancer = Enhancer::new(tmp.path()).with_client(Arc::new(MockLlmClient::new()));

    let result = enhancer
        .enhance("add csv export to the reports page", None)
        .await
        .unwrap();
    assert_eq!(result.source, EnhancementSource::Model);
    assert_eq!(result.category, WorkflowCategory::Feature);
    assert_eq!(result.confidence_score, 85);
    assert_eq!(result.success_criteria.len(), 3);
    assert!(result.validation.is_valid);
}

#[tokio::test]
async fn test_empty_input_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let enhancer = Enhancer::new(tmp.path()).with_client(Arc::new(MockLlmClient::new()));

    for raw in ["", "   ", "\n\t "] {
        let err = enhancer.enhance(raw, None).await.unwrap_err();
        assert!(matches!(err, EnhanceError::EmptyInput));
    }
}

#[tokio::test]
async fn test_every_non_empty_prompt_yields_a_result() {
    let tmp = TempDir::new().unwrap();
    let offline = Enhancer::new(tmp.path());
    let failing = Enhancer::new(tmp.path()).with_client(Arc::new(FailingClient));

    for prompt in PROMPTS {
        for enhancer in [&offline, &failing] {
            let result = enhancer.enhance(prompt, None).await.unwrap();
            assert!(!result.instruction.trim().is_empty(), "{}", prompt);
            assert!(result.validation.score <= 100);
            assert_eq!(result.confidence_score, 50);
            assert_eq!(result.original, prompt.trim());
        }
    }
}

#[tokio::test]
async fn test_explicit_category_overrides_classifier() {
    let tmp = TempDir::new().unwrap();
    let enhancer = Enhancer::new(tmp.path());

    let result = enhancer
        .enhance("fix the crash on startup", Some(WorkflowCategory::Documentation))
        .await
        .unwrap();
    assert_eq!(result.category, WorkflowCategory::Documentation);
}

#[tokio::test]
async fn test_agent_references_from_catalog() {
    let tmp = TempDir::new().unwrap();
    let agents = tmp.path().join(".claude").join("agents");
    fs::create_dir_all(&agents).unwrap();
    fs::write(
        agents.join("nextjs-ui-api-engineer.md"),
        "---\nname: nextjs-ui-api-engineer\ndescription: Next.js pages and API routes\n---\n",
    )
    .unwrap();

    let enhancer = Enhancer::new(tmp.path()).with_client(Arc::new(MockLlmClient::new()));
    let result = enhancer
        .enhance("use nextjs-ui-api-engineer to build the pricing page", None)
        .await
        .unwrap();

    assert_eq!(result.references, vec!["@agent-nextjs-ui-api-engineer"]);
    assert_eq!(result.source, EnhancementSource::Model);
}

#[tokio::test]
async fn test_context_is_attached() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("src")).unwrap();
    fs::write(tmp.path().join("src").join("invoice.rs"), "pub fn total() {}\n").unwrap();
    fs::write(
        tmp.path().join("Cargo.toml"),
        "[package]\nname = \"shop\"\n\n[dependencies]\naxum = \"0.7\"\n",
    )
    .unwrap();

    let result = Enhancer::new(tmp.path())
        .enhance("invoice totals are off by one cent", None)
        .await
        .unwrap();
    let context = result.context.unwrap();
    assert_eq!(context.relevant_files.len(), 1);
    assert_eq!(context.dependencies, vec!["axum"]);
    assert!(context.tech_stack.iter().any(|t| t == "Rust"));
}

#[tokio::test]
async fn test_raw_input_with_metadata() {
    let tmp = TempDir::new().unwrap();
    let enhancer = Enhancer::new(tmp.path());
    assert!(!enhancer.has_client());

    let input = RawInput::new("  the nightly export job times out  ")
        .with_category(WorkflowCategory::Optimization)
        .with_metadata(InputMetadata {
            author: Some("ops".to_string()),
            tags: vec!["nightly".to_string()],
            ..InputMetadata::default()
        });
    let result = enhancer.enhance_input(input).await.unwrap();

    assert_eq!(result.category, WorkflowCategory::Optimization);
    assert_eq!(result.original, "the nightly export job times out");
}
