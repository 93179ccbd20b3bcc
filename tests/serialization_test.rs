//! Stored results survive a JSON round trip and stay readable by `validate`

use promptspec::types::EnhancementSource;
use promptspec::{Enhancer, StructuredResult};
use tempfile::TempDir;

#[tokio::test]
async fn test_result_json_round_trip() {
    let tmp = TempDir::new().unwrap();
    let result = Enhancer::new(tmp.path())
        .enhance("the signup form is broken when the email has a plus sign", None)
        .await
        .unwrap();

    let json = serde_json::to_string_pretty(&result).unwrap();
    assert!(json.contains("\"category\": \"bug\""));
    assert!(json.contains("\"source\": \"fallback\""));

    let back: StructuredResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
    assert_eq!(back.source, EnhancementSource::Fallback);
}

#[tokio::test]
async fn test_stored_result_validates_from_cli() {
    let tmp = TempDir::new().unwrap();
    let result = Enhancer::new(tmp.path())
        .enhance("add a dark mode toggle to the settings page", None)
        .await
        .unwrap();

    let path = tmp.path().join("result.json");
    std::fs::write(&path, serde_json::to_string(&result).unwrap()).unwrap();
    assert!(promptspec::cli::validate::run(path.to_str().unwrap()).is_ok());
}

#[test]
fn test_sparse_json_fills_defaults() {
    let json = r#"{
        "id": "abc",
        "category": "feature",
        "instruction": "Add a dark mode toggle.",
        "created_at": "2024-05-01T12:00:00Z",
        "updated_at": "2024-05-01T12:00:00Z"
    }"#;
    let result: StructuredResult = serde_json::from_str(json).unwrap();
    assert!(result.context.is_none());
    assert!(result.success_criteria.is_empty());
    assert_eq!(result.source, EnhancementSource::Fallback);
    assert!(!result.validation.is_valid);
}
