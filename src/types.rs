//! Data model shared by every stage of the engine.
//!
//! All records are created fresh per enhancement call and returned by value.
//! "Updating" a result produces a new record (see [`StructuredResult::merged`]).

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::EnhanceError;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowCategory {
    Bug,
    Feature,
    Refactor,
    Documentation,
    Research,
    Review,
    Architecture,
    Testing,
    Optimization,
    Security,
    Deployment,
    #[default]
    General,
}

impl WorkflowCategory {
    pub const ALL: [WorkflowCategory; 12] = [
        WorkflowCategory::Bug,
        WorkflowCategory::Feature,
        WorkflowCategory::Refactor,
        WorkflowCategory::Documentation,
        WorkflowCategory::Research,
        WorkflowCategory::Review,
        WorkflowCategory::Architecture,
        WorkflowCategory::Testing,
        WorkflowCategory::Optimization,
        WorkflowCategory::Security,
        WorkflowCategory::Deployment,
        WorkflowCategory::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowCategory::Bug => "bug",
            WorkflowCategory::Feature => "feature",
            WorkflowCategory::Refactor => "refactor",
            WorkflowCategory::Documentation => "documentation",
            WorkflowCategory::Research => "research",
            WorkflowCategory::Review => "review",
            WorkflowCategory::Architecture => "architecture",
            WorkflowCategory::Testing => "testing",
            WorkflowCategory::Optimization => "optimization",
            WorkflowCategory::Security => "security",
            WorkflowCategory::Deployment => "deployment",
            WorkflowCategory::General => "general",
        }
    }
}

impl fmt::Display for WorkflowCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkflowCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bug" | "bugfix" | "fix" => Ok(WorkflowCategory::Bug),
            "feature" => Ok(WorkflowCategory::Feature),
            "refactor" => Ok(WorkflowCategory::Refactor),
            "documentation" | "docs" => Ok(WorkflowCategory::Documentation),
            "research" => Ok(WorkflowCategory::Research),
            "review" => Ok(WorkflowCategory::Review),
            "architecture" | "arch" => Ok(WorkflowCategory::Architecture),
            "testing" | "test" | "tests" => Ok(WorkflowCategory::Testing),
            "optimization" | "perf" => Ok(WorkflowCategory::Optimization),
            "security" => Ok(WorkflowCategory::Security),
            "deployment" | "deploy" => Ok(WorkflowCategory::Deployment),
            "general" => Ok(WorkflowCategory::General),
            _ => bail!("Unknown workflow category: {}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    /// One tier up, saturating at `Complex`.
    pub fn escalate(self) -> Self {
        match self {
            Complexity::Simple => Complexity::Moderate,
            Complexity::Moderate | Complexity::Complex => Complexity::Complex,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// The unstructured prompt as handed to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<WorkflowCategory>,
    #[serde(default)]
    pub metadata: InputMetadata,
}

impl RawInput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: WorkflowCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_metadata(mut self, metadata: InputMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Content with surrounding whitespace removed; empty content is rejected.
    pub fn trimmed_content(&self) -> Result<&str, EnhanceError> {
        let trimmed = self.content.trim();
        if trimmed.is_empty() {
            return Err(EnhanceError::EmptyInput);
        }
        Ok(trimmed)
    }
}

/// A named helper identity discovered in the agents directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub name: String,
    pub description: String,
    pub source: PathBuf,
}

impl AgentIdentity {
    pub fn canonical_token(&self) -> String {
        format!("@agent-{}", self.name)
    }
}

/// A loose mention that matched several catalog entries. The first entry in
/// catalog order was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguousMention {
    pub mention: String,
    pub candidates: Vec<String>,
    pub chosen: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MentionResolution {
    pub original: String,
    pub processed: String,
    pub agents: Vec<AgentIdentity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ambiguities: Vec<AmbiguousMention>,
}

impl MentionResolution {
    pub fn agent_names(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.name.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevantFile {
    pub path: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBundle {
    #[serde(default)]
    pub relevant_files: Vec<RelevantFile>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExpectedOutput {
    /// e.g. "code", "markdown", "report"
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub description: String,
    /// Outline of the deliverable (section names, file layout, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error, // Must fix
    Warning, // Should fix
    Info,    // Nice to have
}

impl Severity {
    pub fn penalty(&self) -> i32 {
        match self {
            Severity::Error => 20,
            Severity::Warning => 10,
            Severity::Info => 5,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub score: u8,
    pub issues: Vec<ValidationIssue>,
    pub suggestions: Vec<String>,
}

impl Default for ValidationResult {
    /// Placeholder for a result that has not been validated yet.
    fn default() -> Self {
        Self {
            is_valid: false,
            score: 0,
            issues: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

impl ValidationResult {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Which path produced the instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementSource {
    Model,
    #[default]
    Fallback,
}

/// The structured object requested from the generative model. The fallback
/// synthesizer produces the same shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AiEnhancement {
    /// Explicit, actionable restatement of the task.
    pub instruction: String,
    #[serde(default)]
    pub category: Option<WorkflowCategory>,
    #[serde(default)]
    pub complexity: Option<Complexity>,
    #[serde(default)]
    pub success_criteria: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub clarifying_questions: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub expected_output: Option<ExpectedOutput>,
    /// 0-100
    #[serde(default)]
    pub confidence_score: Option<u8>,
}

/// The validated, structured specification of a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredResult {
    pub id: String,
    pub category: WorkflowCategory,
    pub instruction: String,
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub context: Option<ContextBundle>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub expected_output: ExpectedOutput,
    #[serde(default)]
    pub validation: ValidationResult,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub source: EnhancementSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(default)]
    pub confidence_score: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clarifying_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub success_criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    /// Canonical `@agent-*` tokens resolved from the prompt.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

impl StructuredResult {
    pub fn relevant_file_count(&self) -> usize {
        self.context
            .as_ref()
            .map(|c| c.relevant_files.len())
            .unwrap_or(0)
    }

    /// Copy with `update` applied and a fresh `updated_at`. The validation is
    /// stale afterwards; callers re-validate.
    pub fn merged(&self, update: ResultUpdate) -> StructuredResult {
        let mut next = self.clone();
        if let Some(instruction) = update.instruction {
            next.instruction = instruction;
        }
        if let Some(category) = update.category {
            next.category = category;
        }
        if let Some(criteria) = update.success_criteria {
            next.success_criteria = criteria;
        }
        if let Some(constraints) = update.constraints {
            next.constraints = constraints;
        }
        if let Some(examples) = update.examples {
            next.examples = examples;
        }
        if let Some(questions) = update.clarifying_questions {
            next.clarifying_questions = questions;
        }
        if let Some(expected) = update.expected_output {
            next.expected_output = expected;
        }
        // Never move backwards, even if the clock does.
        next.updated_at = Utc::now().max(self.updated_at);
        next
    }
}

/// Partial edit of a [`StructuredResult`]; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultUpdate {
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub category: Option<WorkflowCategory>,
    #[serde(default)]
    pub success_criteria: Option<Vec<String>>,
    #[serde(default)]
    pub constraints: Option<Vec<String>>,
    #[serde(default)]
    pub examples: Option<Vec<String>>,
    #[serde(default)]
    pub clarifying_questions: Option<Vec<String>>,
    #[serde(default)]
    pub expected_output: Option<ExpectedOutput>,
}
