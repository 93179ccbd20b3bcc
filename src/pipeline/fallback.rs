//! Deterministic enhancement used when the model is unavailable, fails, or
//! times out. Produces the same [`AiEnhancement`] shape the model would, with
//! a fixed confidence score that marks it as unverified.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::tables::{self, CategoryTemplate};
use crate::classifier::WorkflowClassifier;
use crate::types::{AiEnhancement, Complexity, WorkflowCategory};
use crate::util::{capitalize_first, decapitalize_first, terminate_sentence};

pub const FALLBACK_CONFIDENCE: u8 = 50;

/// Prompts shorter than this get a scope question.
const SHORT_PROMPT_CHARS: usize = 40;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

static COMPLEX_CUES: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(architecture|architect|system|systems|infrastructure)\b",
        r"\b(microservices?|distributed|migrat\w*|redesign|overhaul)\b",
        r"\b(scalab\w*|multi-tenant|end-to-end)\b",
    ])
});

static MODERATE_CUES: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(implement\w*|feature|integrat\w*|build|create)\b",
        r"\b(refactor\w*|api|endpoint|workflow|authentication)\b",
    ])
});

static BROKEN_CUES: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)(not working|broken|doesn't work|does not work|isn't working)").ok());

static NEED_CUES: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)\b(need|needs|want|wants)\b").ok());

static NEED_PREFIX: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(?:i|we|you)\s+)?(?:really\s+)?(?:need|needs|want|wants)\b\s*(?:to\b\s*)?").ok()
});

static FILE_REFERENCE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9_./-]+\.(rs|ts|tsx|js|jsx|py|go|java|rb|vue|svelte|css|scss|html|md|json|toml|ya?ml|sql)\b")
        .ok()
});

static EXPECTATION_CUES: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)\b(should|expected|expect|instead|supposed to)\b").ok());

fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

fn matches(pattern: &Lazy<Option<Regex>>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|p| p.is_match(text))
}

#[derive(Debug, Default)]
pub struct FallbackSynthesizer {
    classifier: WorkflowClassifier,
}

impl FallbackSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn synthesize(&self, text: &str) -> AiEnhancement {
        self.synthesize_with(text, None)
    }

    /// Like [`synthesize`](Self::synthesize) but with the category already
    /// decided by the caller.
    pub fn synthesize_with(&self, text: &str, explicit: Option<WorkflowCategory>) -> AiEnhancement {
        let text = text.trim();
        let category = self.classifier.classify(text, explicit);

        let Some(instruction) = rewrite_instruction(text) else {
            debug!("Fallback rewrite produced nothing; using minimal result");
            return minimal_result(category);
        };

        let template = tables::template(category);
        let complexity = estimate_complexity(text);
        let inputs = file_references(text);
        let clarifying_questions = clarifying_questions(text, category, template, &inputs);

        debug!(
            "Fallback: category={}, complexity={}, {} question(s)",
            category,
            complexity.as_str(),
            clarifying_questions.len()
        );

        AiEnhancement {
            instruction,
            category: Some(category),
            complexity: Some(complexity),
            success_criteria: to_strings(template.success_criteria),
            constraints: to_strings(template.constraints),
            steps: to_strings(template.steps),
            clarifying_questions,
            examples: Vec::new(),
            inputs,
            expected_output: Some(template.expected_output()),
            confidence_score: Some(FALLBACK_CONFIDENCE),
        }
    }
}

pub fn estimate_complexity(text: &str) -> Complexity {
    let lowered = text.to_lowercase();
    let mut complexity = if any_match(&COMPLEX_CUES, &lowered) {
        Complexity::Complex
    } else if any_match(&MODERATE_CUES, &lowered) {
        Complexity::Moderate
    } else {
        // fix/add/update style cues and no cues at all share the bottom tier
        Complexity::Simple
    };

    let length = text.chars().count();
    if length > 300 {
        complexity = complexity.escalate();
    } else if length > 150 && complexity == Complexity::Simple {
        complexity = Complexity::Moderate;
    }
    complexity
}

/// Turn the raw prompt into an imperative sentence. `None` when nothing of
/// the prompt is left to build on.
pub fn rewrite_instruction(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let rewritten = if matches(&BROKEN_CUES, text) {
        format!("Fix the issue where {}", decapitalize_first(text))
    } else if matches(&NEED_CUES, text) {
        let rest = match NEED_PREFIX.as_ref() {
            Some(prefix) => prefix.replace(text, "").trim().to_string(),
            None => text.to_string(),
        };
        let rest = rest.trim_end_matches(['.', '!', '?']).trim();
        if rest.is_empty() {
            return None;
        }
        format!("Implement functionality to {}", decapitalize_first(rest))
    } else {
        format!("Implement: {}", text)
    };

    Some(terminate_sentence(&capitalize_first(&rewritten)))
}

fn file_references(text: &str) -> Vec<String> {
    let Some(pattern) = FILE_REFERENCE.as_ref() else {
        return Vec::new();
    };
    let mut refs: Vec<String> = Vec::new();
    for m in pattern.find_iter(text) {
        let reference = m.as_str().trim_start_matches("./").to_string();
        if !refs.contains(&reference) {
            refs.push(reference);
        }
    }
    refs
}

fn clarifying_questions(
    text: &str,
    category: WorkflowCategory,
    template: &CategoryTemplate,
    file_refs: &[String],
) -> Vec<String> {
    let mut questions = Vec::new();
    if file_refs.is_empty() {
        questions.push("Which files or modules does this involve?".to_string());
    }
    if category == WorkflowCategory::Bug && !matches(&EXPECTATION_CUES, text) {
        questions.push("What is the expected behavior, and what happens instead?".to_string());
    }
    if text.chars().count() < SHORT_PROMPT_CHARS {
        questions.push(template.scope_question.to_string());
    }
    questions
}

fn minimal_result(category: WorkflowCategory) -> AiEnhancement {
    let template = tables::template(WorkflowCategory::General);
    AiEnhancement {
        instruction: "Clarify and complete the requested task.".to_string(),
        category: Some(category),
        complexity: Some(Complexity::Simple),
        success_criteria: to_strings(template.success_criteria),
        steps: to_strings(template.steps),
        clarifying_questions: vec!["What exactly should be done?".to_string()],
        expected_output: Some(template.expected_output()),
        confidence_score: Some(FALLBACK_CONFIDENCE),
        ..AiEnhancement::default()
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_broken() {
        assert_eq!(
            rewrite_instruction("The login button is not working on mobile").unwrap(),
            "Fix the issue where the login button is not working on mobile."
        );
    }

    #[test]
    fn test_rewrite_need() {
        assert_eq!(
            rewrite_instruction("I need to export invoices as CSV").unwrap(),
            "Implement functionality to export invoices as CSV."
        );
        assert_eq!(
            rewrite_instruction("we want to let admins ban users!").unwrap(),
            "Implement functionality to let admins ban users."
        );
    }

    #[test]
    fn test_rewrite_prefixes_plain_requests() {
        assert_eq!(
            rewrite_instruction("add a dark mode toggle").unwrap(),
            "Implement: add a dark mode toggle."
        );
        // The broken cue applies even when the prompt opens with a verb
        assert_eq!(
            rewrite_instruction("Fix the broken pagination?").unwrap(),
            "Fix the issue where fix the broken pagination?"
        );
    }

    #[test]
    fn test_rewrite_generic_and_acronym() {
        assert_eq!(
            rewrite_instruction("API rate limits for the public endpoints").unwrap(),
            "Implement: API rate limits for the public endpoints."
        );
    }

    #[test]
    fn test_rewrite_nothing_left() {
        assert_eq!(rewrite_instruction("I need to."), None);
        assert_eq!(rewrite_instruction("   "), None);
    }

    #[test]
    fn test_complexity_tiers() {
        assert_eq!(estimate_complexity("fix a typo"), Complexity::Simple);
        assert_eq!(estimate_complexity("implement the search feature"), Complexity::Moderate);
        assert_eq!(estimate_complexity("redesign the system architecture"), Complexity::Complex);
    }

    #[test]
    fn test_complexity_length_modulation() {
        let medium = format!("fix a typo {}", "x".repeat(150));
        assert_eq!(estimate_complexity(&medium), Complexity::Moderate);
        let long = format!("implement the search feature {}", "x".repeat(300));
        assert_eq!(estimate_complexity(&long), Complexity::Complex);
    }

    #[test]
    fn test_synthesize_bug_questions() {
        let result = FallbackSynthesizer::new().synthesize("login crashes");
        assert_eq!(result.category, Some(WorkflowCategory::Bug));
        assert_eq!(result.confidence_score, Some(FALLBACK_CONFIDENCE));
        assert_eq!(result.clarifying_questions.len(), 3);
        assert!(result.success_criteria.len() >= 2);
    }

    #[test]
    fn test_synthesize_collects_file_refs() {
        let result = FallbackSynthesizer::new()
            .synthesize("Update ./src/config.rs and docs/setup.md so the timeout is configurable");
        assert_eq!(result.inputs, vec!["src/config.rs", "docs/setup.md"]);
        assert!(!result
            .clarifying_questions
            .iter()
            .any(|q| q.contains("Which files")));
    }

    #[test]
    fn test_synthesize_respects_explicit_category() {
        let result = FallbackSynthesizer::new()
            .synthesize_with("fix the login crash", Some(WorkflowCategory::Documentation));
        assert_eq!(result.category, Some(WorkflowCategory::Documentation));
        assert_eq!(result.expected_output.unwrap().format, "markdown");
    }

    #[test]
    fn test_minimal_result() {
        let result = FallbackSynthesizer::new().synthesize("I need to");
        assert_eq!(result.instruction, "Clarify and complete the requested task.");
        assert_eq!(result.confidence_score, Some(FALLBACK_CONFIDENCE));
    }
}
