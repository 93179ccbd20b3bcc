//! Keyword-pattern classification of raw prompts into a [`WorkflowCategory`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

use crate::types::WorkflowCategory;

/// Category → curated patterns (synonyms and common inflections).
/// Matched against lower-cased text; every non-overlapping match counts.
pub const CATEGORY_PATTERNS: &[(WorkflowCategory, &[&str])] = &[
    (
        WorkflowCategory::Bug,
        &[
            r"\b(bug|bugs|buggy)\b",
            r"\b(fix|fixes|fixed|fixing)\b",
            r"\b(error|errors|exception|crash|crashes|crashed|crashing)\b",
            r"\b(broken|not working|doesn't work|fails|failing|failed)\b",
        ],
    ),
    (
        WorkflowCategory::Feature,
        &[
            r"\b(add|adding|implement|implements|implementing)\b",
            r"\b(new feature|feature|features)\b",
            r"\b(create|build|support for)\b",
            r"\b(ability to|allow users?|enable)\b",
        ],
    ),
    (
        WorkflowCategory::Refactor,
        &[
            r"\brefactor(s|ed|ing)?\b",
            r"\b(restructure|reorganize|clean ?up)\b",
            r"\b(simplify|extract|decouple|rename)\b",
            r"\b(technical debt|tech debt|maintainab\w*)\b",
        ],
    ),
    (
        WorkflowCategory::Documentation,
        &[
            r"\b(document|documentation|documented|documenting|docs?)\b",
            r"\breadme\b",
            r"\b(comments?|docstrings?|jsdoc|rustdoc)\b",
            r"\b(guide|tutorial|explain)\b",
        ],
    ),
    (
        WorkflowCategory::Research,
        &[
            r"\b(research|investigate|investigation)\b",
            r"\b(explore|evaluate|compare|comparison)\b",
            r"\b(find out|look into|spike)\b",
            r"\b(options|alternatives|feasibility)\b",
        ],
    ),
    (
        WorkflowCategory::Review,
        &[
            r"\b(review|reviewing|reviewed)\b",
            r"\b(code review|pr|pull request)\b",
            r"\b(audit|inspect|feedback)\b",
        ],
    ),
    (
        WorkflowCategory::Architecture,
        &[
            r"\b(architecture|architectural)\b",
            r"\b(design|system design)\b",
            r"\b(microservices?|monolith|modular\w*)\b",
            r"\b(scalab\w*|infrastructure)\b",
        ],
    ),
    (
        WorkflowCategory::Testing,
        &[
            r"\b(test|tests|testing)\b",
            r"\b(unit|integration|e2e|end-to-end)\b",
            r"\b(coverage|test suite)\b",
            r"\b(mock|mocks|fixture|fixtures|assert\w*)\b",
        ],
    ),
    (
        WorkflowCategory::Optimization,
        &[
            r"\b(optimi[sz]e|optimi[sz]ation|optimi[sz]ing)\b",
            r"\b(performance|perf|faster|speed up)\b",
            r"\b(slow|latency|bottleneck)\b",
            r"\b(memory|cpu|cache|caching)\b",
        ],
    ),
    (
        WorkflowCategory::Security,
        &[
            r"\b(security|secure|vulnerab\w*)\b",
            r"\b(authenticat\w*|authoriz\w*|permissions?|access control)\b",
            r"\b(xss|csrf|injection|sanitiz\w*)\b",
            r"\b(encrypt\w*|secrets?|credentials?)\b",
        ],
    ),
    (
        WorkflowCategory::Deployment,
        &[
            r"\b(deploy\w*|release|releases)\b",
            r"\b(ci|cd|ci/cd|pipeline)\b",
            r"\b(docker\w*|kubernetes|k8s|containers?)\b",
            r"\b(production|staging|hosting)\b",
        ],
    ),
];

static COMPILED: Lazy<Vec<(WorkflowCategory, Vec<Regex>)>> = Lazy::new(|| {
    CATEGORY_PATTERNS
        .iter()
        .map(|(category, patterns)| {
            let compiled = patterns
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect();
            (*category, compiled)
        })
        .collect()
});

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowClassifier;

impl WorkflowClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Pick a category for `text`. An explicit category always wins.
    pub fn classify(&self, text: &str, explicit: Option<WorkflowCategory>) -> WorkflowCategory {
        if let Some(category) = explicit {
            debug!("Using explicit category: {}", category);
            return category;
        }

        let scores = self.scores(text);
        let best = scores.values().copied().max().unwrap_or(0);
        if best == 0 {
            return WorkflowCategory::General;
        }

        let mut leaders = scores.iter().filter(|(_, score)| **score == best);
        let category = match (leaders.next(), leaders.next()) {
            (Some((category, _)), None) => *category,
            // Tie between two or more categories
            _ => WorkflowCategory::General,
        };

        debug!("Classified as {} (score {})", category, best);
        category
    }

    /// Aggregate match count per category (categories without patterns are absent).
    pub fn scores(&self, text: &str) -> BTreeMap<WorkflowCategory, usize> {
        let lowered = text.to_lowercase();
        COMPILED
            .iter()
            .map(|(category, patterns)| {
                let score = patterns
                    .iter()
                    .map(|re| re.find_iter(&lowered).count())
                    .sum();
                (*category, score)
            })
            .collect()
    }
}
