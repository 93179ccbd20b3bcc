//! HTTP clients against a local mock server

use promptspec::llm::client::LlmClient;
use promptspec::llm::client_impl::{AnthropicClient, OpenAIClient};
use promptspec::llm::structured;
use promptspec::types::AiEnhancement;

fn openai_body(content: &str) -> String {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

#[tokio::test]
async fn test_openai_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(openai_body("hello"))
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url(
        "test-key".to_string(),
        "gpt-4o".to_string(),
        server.url(),
        1024,
        10,
    )
    .unwrap();
    let reply = client.complete("say hello").await.unwrap();

    assert_eq!(reply, "hello");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_openai_without_key_sends_no_auth() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", mockito::Matcher::Missing)
        .with_status(200)
        .with_body(openai_body("local"))
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url(
        String::new(),
        "llama3".to_string(),
        format!("{}/", server.url()),
        1024,
        10,
    )
    .unwrap();
    assert_eq!(client.complete("hi").await.unwrap(), "local");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_openai_server_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url(
        "k".to_string(),
        "gpt-4o".to_string(),
        server.url(),
        1024,
        10,
    )
    .unwrap();
    let err = client.complete("hi").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("500"), "{}", message);
    assert!(message.contains("upstream exploded"));
}

#[tokio::test]
async fn test_anthropic_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/messages")
        .match_header("x-api-key", "secret")
        .match_header("anthropic-version", "2023-06-01")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"content": [{"type": "text", "text": "bonjour"}]}"#)
        .create_async()
        .await;

    let client = AnthropicClient::with_base_url(
        "secret".to_string(),
        "claude-sonnet-4-20250514".to_string(),
        server.url(),
        1024,
        10,
    )
    .unwrap();
    assert_eq!(client.complete("hi").await.unwrap(), "bonjour");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_anthropic_server_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/messages")
        .with_status(529)
        .with_body("overloaded")
        .create_async()
        .await;

    let client = AnthropicClient::with_base_url(
        "secret".to_string(),
        "claude-sonnet-4-20250514".to_string(),
        server.url(),
        1024,
        10,
    )
    .unwrap();
    assert!(client.complete("hi").await.is_err());
}

#[tokio::test]
async fn test_structured_generation_over_http() {
    let enhancement = serde_json::json!({
        "instruction": "Add CSV export to the reports page.",
        "success_criteria": ["Export downloads a CSV", "Headers match the table"],
        "confidence_score": 80
    });
    let content = format!("```json\n{}\n```", enhancement);

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(openai_body(&content))
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url(
        "k".to_string(),
        "gpt-4o".to_string(),
        server.url(),
        1024,
        10,
    )
    .unwrap();
    let parsed: AiEnhancement = structured::generate(&client, "export reports").await.unwrap();

    assert_eq!(parsed.instruction, "Add CSV export to the reports page.");
    assert_eq!(parsed.success_criteria.len(), 2);
    assert_eq!(parsed.confidence_score, Some(80));
    assert!(parsed.constraints.is_empty());
}
