//! Classification through the public API

use promptspec::classifier::WorkflowClassifier;
use promptspec::WorkflowCategory;

#[test]
fn test_typical_prompts() {
    let classifier = WorkflowClassifier::new();
    let cases = [
        ("fix the login bug that crashes on submit", WorkflowCategory::Bug),
        ("write documentation and a README for the CLI", WorkflowCategory::Documentation),
        ("add unit tests and integration tests for the parser", WorkflowCategory::Testing),
        ("review this pull request", WorkflowCategory::Review),
    ];
    for (text, expected) in cases {
        assert_eq!(classifier.classify(text, None), expected, "{}", text);
    }
}

#[test]
fn test_deterministic() {
    let classifier = WorkflowClassifier::new();
    let text = "Investigate why the build is slow and optimize the cache";
    let first = classifier.classify(text, None);
    for _ in 0..10 {
        assert_eq!(classifier.classify(text, None), first);
    }
    assert_eq!(classifier.scores(text), classifier.scores(text));
}

#[test]
fn test_no_signal_is_general() {
    let classifier = WorkflowClassifier::new();
    assert_eq!(classifier.classify("hello there", None), WorkflowCategory::General);
    assert_eq!(classifier.classify("", None), WorkflowCategory::General);
}

#[test]
fn test_explicit_category_wins() {
    let classifier = WorkflowClassifier::new();
    assert_eq!(
        classifier.classify("fix the crash", Some(WorkflowCategory::Security)),
        WorkflowCategory::Security
    );
}
