//! Markdown export of a [`StructuredResult`], with a frontmatter block that
//! tools can read back without parsing the body.

use std::fmt::Write;

use crate::types::{EnhancementSource, Severity, StructuredResult};

pub fn to_markdown(result: &StructuredResult) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "---");
    let _ = writeln!(out, "id: {}", result.id);
    let _ = writeln!(out, "category: {}", result.category);
    let _ = writeln!(out, "score: {}", result.validation.score);
    let _ = writeln!(out, "valid: {}", result.validation.is_valid);
    let _ = writeln!(
        out,
        "source: {}",
        match result.source {
            EnhancementSource::Model => "model",
            EnhancementSource::Fallback => "fallback",
        }
    );
    let _ = writeln!(out, "confidence: {}", result.confidence_score);
    if let Some(complexity) = result.complexity {
        let _ = writeln!(out, "complexity: {}", complexity.as_str());
    }
    let _ = writeln!(out, "created_at: {}", result.created_at.to_rfc3339());
    let _ = writeln!(out, "---\n");

    let _ = writeln!(out, "## Instruction\n\n{}\n", result.instruction);

    if !result.references.is_empty() {
        let _ = writeln!(out, "**Agents:** {}\n", result.references.join(", "));
    }

    list_section(&mut out, "Success Criteria", &result.success_criteria, false);
    list_section(&mut out, "Constraints", &result.constraints, false);
    list_section(&mut out, "Steps", &result.steps, true);
    list_section(&mut out, "Examples", &result.examples, false);
    list_section(&mut out, "Inputs", &result.inputs, false);

    let expected = &result.expected_output;
    if !expected.format.is_empty() || !expected.description.is_empty() {
        let _ = writeln!(out, "## Expected Output\n");
        if !expected.format.is_empty() {
            let _ = writeln!(out, "- Format: {}", expected.format);
        }
        if !expected.description.is_empty() {
            let _ = writeln!(out, "- Description: {}", expected.description);
        }
        if let Some(structure) = &expected.structure {
            let _ = writeln!(out, "- Structure: {}", structure);
        }
        out.push('\n');
    }

    if let Some(context) = &result.context {
        if !context.tech_stack.is_empty() || !context.relevant_files.is_empty() {
            let _ = writeln!(out, "## Context\n");
            if !context.tech_stack.is_empty() {
                let _ = writeln!(out, "Tech stack: {}\n", context.tech_stack.join(", "));
            }
            for file in &context.relevant_files {
                let _ = writeln!(out, "- `{}`: {}", file.path, file.summary);
            }
            if !context.relevant_files.is_empty() {
                out.push('\n');
            }
        }
    }

    list_section(
        &mut out,
        "Clarifying Questions",
        &result.clarifying_questions,
        false,
    );

    if !result.validation.issues.is_empty() {
        let _ = writeln!(out, "## Validation\n");
        for issue in &result.validation.issues {
            let marker = match issue.severity {
                Severity::Error => "❌",
                Severity::Warning => "⚠️",
                Severity::Info => "ℹ️",
            };
            let _ = writeln!(out, "- {} [{}] {}", marker, issue.field, issue.message);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "## Original Prompt\n\n> {}", result.original.replace('\n', "\n> "));
    out
}

fn list_section(out: &mut String, title: &str, items: &[String], numbered: bool) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "## {}\n", title);
    for (i, item) in items.iter().enumerate() {
        if numbered {
            let _ = writeln!(out, "{}. {}", i + 1, item);
        } else {
            let _ = writeln!(out, "- {}", item);
        }
    }
    out.push('\n');
}
