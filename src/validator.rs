//! Rule-based quality scoring of a [`StructuredResult`].
//!
//! The validator never fails and never mutates its input. Findings are data:
//! each rule that fires adds a [`ValidationIssue`], and the score is derived
//! from the issue severities plus a fixed set of completeness bonuses.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{
    ContextBundle, Severity, StructuredResult, ValidationIssue, ValidationResult, WorkflowCategory,
};

/// Instructions shorter than this are flagged as too terse.
pub const MIN_INSTRUCTION_CHARS: usize = 20;

/// Score at or above which a result is reported as good quality.
pub const PASSING_SCORE: u8 = 50;

static VAGUE_WORDS: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)\b(something|somehow|stuff|things?|whatever)\b").ok());

static ACTION_VERBS: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(create|implement|fix|add|update|refactor|document|write|build|remove|delete|rename|migrate|optimi[sz]e|test|review|investigate|research|design|deploy|configure|secure|audit|improve|replace|extract|debug|resolve|validate|integrate|upgrade|analy[sz]e)\b",
    )
    .ok()
});

pub struct QualityValidator;

impl Default for QualityValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, result: &StructuredResult) -> ValidationResult {
        let mut issues = Vec::new();

        self.check_required(result, &mut issues);
        self.check_instruction(result, &mut issues);
        self.check_context(result, &mut issues);
        self.check_category(result, &mut issues);

        let score = self.score(result, &issues);
        let suggestions = self.suggestions(result, &issues);
        let is_valid = !issues.iter().any(|i| i.severity == Severity::Error);

        ValidationResult {
            is_valid,
            score,
            issues,
            suggestions,
        }
    }

    fn check_required(&self, result: &StructuredResult, issues: &mut Vec<ValidationIssue>) {
        if result.id.trim().is_empty() {
            issues.push(issue(
                Severity::Error,
                "id",
                "Missing result id",
                Some("Assign a unique id to the result"),
            ));
        }
        if result.instruction.trim().is_empty() {
            issues.push(issue(
                Severity::Error,
                "instruction",
                "Missing instruction",
                Some("State the task as an explicit, actionable instruction"),
            ));
        }
        if result.context.is_none() {
            issues.push(issue(
                Severity::Error,
                "context",
                "Missing context",
                Some("Attach the project context (files, dependencies, tech stack)"),
            ));
        }
    }

    fn check_instruction(&self, result: &StructuredResult, issues: &mut Vec<ValidationIssue>) {
        let instruction = result.instruction.trim();
        if instruction.is_empty() {
            return;
        }

        let length = instruction.chars().count();
        if length < MIN_INSTRUCTION_CHARS {
            issues.push(issue(
                Severity::Warning,
                "instruction",
                &format!(
                    "Instruction is too short ({} chars, minimum {})",
                    length, MIN_INSTRUCTION_CHARS
                ),
                Some("Describe what should change, where, and how to tell it worked"),
            ));
        }

        if let Some(vague) = VAGUE_WORDS.as_ref() {
            let mut found: Vec<String> = Vec::new();
            for m in vague.find_iter(instruction) {
                let word = m.as_str().to_lowercase();
                if !found.contains(&word) {
                    found.push(word);
                }
            }
            if !found.is_empty() {
                issues.push(issue(
                    Severity::Warning,
                    "instruction",
                    &format!("Instruction contains vague wording: {}", found.join(", ")),
                    Some("Replace vague words with the specific component or behavior"),
                ));
            }
        }

        let has_verb = ACTION_VERBS
            .as_ref()
            .is_some_and(|verbs| verbs.is_match(instruction));
        if !has_verb {
            issues.push(issue(
                Severity::Info,
                "instruction",
                "Instruction has no recognizable action verb",
                Some("Start the instruction with a verb such as fix, add, or implement"),
            ));
        }
    }

    fn check_context(&self, result: &StructuredResult, issues: &mut Vec<ValidationIssue>) {
        // A missing bundle is an error and also counts as empty lists
        let empty = ContextBundle::default();
        let context = result.context.as_ref().unwrap_or(&empty);

        if context.relevant_files.is_empty() {
            issues.push(issue(
                Severity::Info,
                "context.relevant_files",
                "No relevant files identified",
                Some("Mention the files or modules the task touches"),
            ));
        }
        if context.tech_stack.is_empty() {
            issues.push(issue(
                Severity::Warning,
                "context.tech_stack",
                "Tech stack is unknown",
                Some("Name the language and frameworks involved"),
            ));
        }
        if context.dependencies.is_empty() {
            issues.push(issue(
                Severity::Info,
                "context.dependencies",
                "No dependencies detected",
                None,
            ));
        }
    }

    fn check_category(&self, result: &StructuredResult, issues: &mut Vec<ValidationIssue>) {
        match result.category {
            WorkflowCategory::Bug | WorkflowCategory::Feature
                if result.success_criteria.len() < 2 =>
            {
                issues.push(issue(
                    Severity::Warning,
                    "success_criteria",
                    &format!(
                        "A {} task should have at least 2 success criteria (found {})",
                        result.category,
                        result.success_criteria.len()
                    ),
                    Some("List observable outcomes that show the task is done"),
                ));
            }
            WorkflowCategory::Refactor if result.constraints.is_empty() => {
                issues.push(issue(
                    Severity::Warning,
                    "constraints",
                    "A refactor should state at least one constraint",
                    Some("State what must not change (public API, behavior, performance)"),
                ));
            }
            WorkflowCategory::Documentation
                if result
                    .expected_output
                    .structure
                    .as_deref()
                    .is_none_or(|s| s.trim().is_empty()) =>
            {
                issues.push(issue(
                    Severity::Warning,
                    "expected_output.structure",
                    "Documentation task has no output structure",
                    Some("Outline the sections the documentation should contain"),
                ));
            }
            _ => {}
        }
    }

    /// Penalties per issue, completeness bonuses, clamped to 0..=100. Bonuses
    /// are not capped by the penalties, so a feature-rich result with several
    /// warnings can still reach 100.
    fn score(&self, result: &StructuredResult, issues: &[ValidationIssue]) -> u8 {
        let mut score: i32 = 100;
        for i in issues {
            score -= i.severity.penalty();
        }

        let instruction_len = result.instruction.trim().chars().count();
        let bonuses = [
            result.success_criteria.len() >= 3,
            !result.examples.is_empty(),
            !result.constraints.is_empty(),
            result.relevant_file_count() > 3,
            instruction_len > 100,
            instruction_len > 200,
        ];
        score += 5 * bonuses.iter().filter(|b| **b).count() as i32;

        score.clamp(0, 100) as u8
    }

    fn suggestions(&self, result: &StructuredResult, issues: &[ValidationIssue]) -> Vec<String> {
        let mut suggestions: Vec<String> = Vec::new();
        for fix in issues.iter().filter_map(|i| i.fix.as_ref()) {
            if !suggestions.contains(fix) {
                suggestions.push(fix.clone());
            }
        }
        if !result.clarifying_questions.is_empty() {
            suggestions.push(format!(
                "Answer the {} clarifying question(s) to sharpen the task",
                result.clarifying_questions.len()
            ));
        }
        suggestions
    }

    pub fn print_issues(&self, validation: &ValidationResult) {
        let issues = &validation.issues;
        if issues.is_empty() {
            println!("✅ No validation issues found (score {})", validation.score);
            return;
        }

        println!("\n📋 Validation Results (score {}):\n", validation.score);

        for (severity, heading) in [
            (Severity::Error, "❌ Errors"),
            (Severity::Warning, "⚠️  Warnings"),
            (Severity::Info, "ℹ️  Info"),
        ] {
            let group: Vec<_> = issues.iter().filter(|i| i.severity == severity).collect();
            if group.is_empty() {
                continue;
            }
            println!("{} ({}):", heading, group.len());
            for issue in &group {
                println!("   • [{}] {}", issue.field, issue.message);
                if let Some(fix) = &issue.fix {
                    println!("     💡 {}", fix);
                }
            }
            println!();
        }

        println!(
            "Summary: {} errors, {} warnings, {} info",
            validation.count(Severity::Error),
            validation.count(Severity::Warning),
            validation.count(Severity::Info)
        );
    }
}

fn issue(severity: Severity, field: &str, message: &str, fix: Option<&str>) -> ValidationIssue {
    ValidationIssue {
        severity,
        field: field.to_string(),
        message: message.to_string(),
        fix: fix.map(str::to_string),
    }
}
