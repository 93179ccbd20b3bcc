// Prompt template for the enhancement call.

use crate::types::{AgentIdentity, ContextBundle, WorkflowCategory};

/// Opening line of the enhancement prompt. The mock client keys on it.
pub const ENHANCEMENT_MARKER: &str = "Rewrite the task below as a structured, actionable specification.";

const TASK_OPEN: &str = "<task>";
const TASK_CLOSE: &str = "</task>";

pub fn enhancement_prompt(
    task: &str,
    category: WorkflowCategory,
    agents: &[AgentIdentity],
    context: &ContextBundle,
) -> String {
    let agents_section = if agents.is_empty() {
        "None".to_string()
    } else {
        agents
            .iter()
            .map(|a| format!("- {}: {}", a.canonical_token(), a.description))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let files_section = if context.relevant_files.is_empty() {
        "None found".to_string()
    } else {
        context
            .relevant_files
            .iter()
            .map(|f| format!("- {} ({})", f.path, f.summary))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let tech = join_or(&context.tech_stack, "Unknown");
    let deps = join_or(&context.dependencies, "None detected");

    format!(
        r#"{marker}

You are helping a developer turn a rough request into a task specification
that another engineer (or coding agent) can execute without follow-up.

Workflow category: {category}

{open}
{task}
{close}

Helper agents referenced in the task (keep these tokens verbatim in the instruction):
{agents}

Project context:
Tech stack: {tech}
Dependencies: {deps}
Relevant files:
{files}

Requirements:
- "instruction": one explicit, imperative paragraph. No vague words (something, stuff, somehow).
- "success_criteria": 3-5 observable outcomes.
- "constraints": what must not change or must be respected.
- "steps": an ordered plan.
- "clarifying_questions": only questions whose answers would change the plan.
- "examples": concrete input/output examples when they help.
- "confidence_score": 0-100, how sure you are the instruction matches the intent.
- Reference only files listed above or named in the task.
"#,
        marker = ENHANCEMENT_MARKER,
        category = category,
        open = TASK_OPEN,
        task = task,
        close = TASK_CLOSE,
        agents = agents_section,
        tech = tech,
        deps = deps,
        files = files_section,
    )
}

/// The task text embedded in an enhancement prompt.
pub fn extract_task(prompt: &str) -> Option<&str> {
    let start = prompt.find(TASK_OPEN)? + TASK_OPEN.len();
    let end = start + prompt[start..].find(TASK_CLOSE)?;
    let task = prompt[start..end].trim();
    (!task.is_empty()).then_some(task)
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RelevantFile;
    use std::path::PathBuf;

    #[test]
    fn test_prompt_includes_context() {
        let agents = vec![AgentIdentity {
            name: "code-reviewer".to_string(),
            description: "Reviews diffs".to_string(),
            source: PathBuf::from("code-reviewer.md"),
        }];
        let context = ContextBundle {
            relevant_files: vec![RelevantFile {
                path: "src/auth.ts".to_string(),
                summary: "TypeScript source in src".to_string(),
            }],
            dependencies: vec!["next".to_string()],
            tech_stack: vec!["Node.js".to_string(), "Next.js".to_string()],
        };
        let prompt = enhancement_prompt("fix login", WorkflowCategory::Bug, &agents, &context);
        assert!(prompt.starts_with(ENHANCEMENT_MARKER));
        assert!(prompt.contains("Workflow category: bug"));
        assert!(prompt.contains("- @agent-code-reviewer: Reviews diffs"));
        assert!(prompt.contains("Tech stack: Node.js, Next.js"));
        assert!(prompt.contains("- src/auth.ts (TypeScript source in src)"));
    }

    #[test]
    fn test_extract_task() {
        let prompt = enhancement_prompt(
            "  add dark mode  ",
            WorkflowCategory::Feature,
            &[],
            &ContextBundle::default(),
        );
        assert_eq!(extract_task(&prompt), Some("add dark mode"));
        assert_eq!(extract_task("no markers"), None);
        assert_eq!(extract_task("<task>   </task>"), None);
    }
}
