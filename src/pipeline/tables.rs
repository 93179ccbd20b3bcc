//! Static per-category content used when the model is unavailable.

use crate::types::{ExpectedOutput, WorkflowCategory};

pub struct CategoryTemplate {
    pub success_criteria: &'static [&'static str],
    pub constraints: &'static [&'static str],
    pub steps: &'static [&'static str],
    pub output_format: &'static str,
    pub output_description: &'static str,
    pub output_structure: Option<&'static str>,
    /// Asked when the prompt gives no hint about scope
    pub scope_question: &'static str,
}

impl CategoryTemplate {
    pub fn expected_output(&self) -> ExpectedOutput {
        ExpectedOutput {
            format: self.output_format.to_string(),
            description: self.output_description.to_string(),
            structure: self.output_structure.map(str::to_string),
        }
    }
}

pub fn template(category: WorkflowCategory) -> &'static CategoryTemplate {
    match category {
        WorkflowCategory::Bug => &BUG,
        WorkflowCategory::Feature => &FEATURE,
        WorkflowCategory::Refactor => &REFACTOR,
        WorkflowCategory::Documentation => &DOCUMENTATION,
        WorkflowCategory::Research => &RESEARCH,
        WorkflowCategory::Review => &REVIEW,
        WorkflowCategory::Architecture => &ARCHITECTURE,
        WorkflowCategory::Testing => &TESTING,
        WorkflowCategory::Optimization => &OPTIMIZATION,
        WorkflowCategory::Security => &SECURITY,
        WorkflowCategory::Deployment => &DEPLOYMENT,
        WorkflowCategory::General => &GENERAL,
    }
}

static BUG: CategoryTemplate = CategoryTemplate {
    success_criteria: &[
        "The reported failure can no longer be reproduced",
        "A regression test covers the failing case",
        "No existing tests fail after the fix",
    ],
    constraints: &[
        "Keep the fix scoped to the root cause",
        "Do not change unrelated behavior",
    ],
    steps: &[
        "Reproduce the issue and capture the failing input",
        "Locate the root cause",
        "Write a failing test for the case",
        "Apply the fix",
        "Run the full test suite",
    ],
    output_format: "code",
    output_description: "A focused code change with a regression test",
    output_structure: None,
    scope_question: "Which component or page shows the problem?",
};

static FEATURE: CategoryTemplate = CategoryTemplate {
    success_criteria: &[
        "The new behavior works as described",
        "The feature is covered by tests",
        "Existing functionality is unaffected",
    ],
    constraints: &[
        "Follow the existing project conventions",
        "Keep public interfaces backward compatible",
    ],
    steps: &[
        "Clarify the expected behavior and edge cases",
        "Design the change against the existing structure",
        "Implement the feature",
        "Add tests",
        "Update user-facing documentation",
    ],
    output_format: "code",
    output_description: "Working implementation with tests",
    output_structure: None,
    scope_question: "Which part of the application should the feature live in?",
};

static REFACTOR: CategoryTemplate = CategoryTemplate {
    success_criteria: &[
        "Observable behavior is unchanged",
        "All existing tests pass",
        "The code is simpler to read and change",
    ],
    constraints: &[
        "Preserve the public API",
        "No functional changes mixed into the refactor",
    ],
    steps: &[
        "Make sure the affected code is covered by tests",
        "Refactor in small, verifiable steps",
        "Run the tests after each step",
        "Remove dead code",
    ],
    output_format: "code",
    output_description: "Restructured code with identical behavior",
    output_structure: None,
    scope_question: "Which modules are in scope for the refactor?",
};

static DOCUMENTATION: CategoryTemplate = CategoryTemplate {
    success_criteria: &[
        "The documented behavior matches the code",
        "Examples run as written",
        "A newcomer can follow the guide without outside help",
    ],
    constraints: &["Match the tone and format of the existing docs"],
    steps: &[
        "Identify the audience",
        "Outline the sections",
        "Write the content with examples",
        "Verify the examples against the code",
    ],
    output_format: "markdown",
    output_description: "Documentation in Markdown",
    output_structure: Some("Overview, Usage, Examples, Reference"),
    scope_question: "Who is the intended audience for this documentation?",
};

static RESEARCH: CategoryTemplate = CategoryTemplate {
    success_criteria: &[
        "At least two options are compared",
        "A recommendation is given with its trade-offs",
    ],
    constraints: &["Cite sources for every claim"],
    steps: &[
        "Define the question and evaluation criteria",
        "Collect candidate options",
        "Compare the options against the criteria",
        "Write up a recommendation",
    ],
    output_format: "report",
    output_description: "A short written comparison with a recommendation",
    output_structure: Some("Question, Options, Comparison, Recommendation"),
    scope_question: "What decision will this research inform?",
};

static REVIEW: CategoryTemplate = CategoryTemplate {
    success_criteria: &[
        "Every finding references a file and line",
        "Findings are ranked by severity",
    ],
    constraints: &["Review only the changed code unless asked otherwise"],
    steps: &[
        "Read the change description",
        "Review correctness and edge cases",
        "Review readability and tests",
        "Summarize findings",
    ],
    output_format: "report",
    output_description: "A list of review findings",
    output_structure: Some("Summary, Findings, Suggestions"),
    scope_question: "Which change or files should be reviewed?",
};

static ARCHITECTURE: CategoryTemplate = CategoryTemplate {
    success_criteria: &[
        "Components and their responsibilities are defined",
        "Data flow between components is documented",
        "Trade-offs of the chosen design are stated",
    ],
    constraints: &[
        "Fit within the current deployment environment",
        "Allow incremental migration",
    ],
    steps: &[
        "Capture requirements and constraints",
        "Propose candidate designs",
        "Evaluate the trade-offs",
        "Document the chosen design",
    ],
    output_format: "document",
    output_description: "A design document",
    output_structure: Some("Context, Decision, Components, Data Flow, Trade-offs"),
    scope_question: "What scale and constraints must the design handle?",
};

static TESTING: CategoryTemplate = CategoryTemplate {
    success_criteria: &[
        "New tests cover the happy path and the edge cases",
        "Tests pass reliably",
        "Coverage of the target code increases",
    ],
    constraints: &["Tests must not depend on external services"],
    steps: &[
        "Identify the untested behavior",
        "Write the test cases",
        "Run and stabilize the tests",
    ],
    output_format: "code",
    output_description: "Test code",
    output_structure: None,
    scope_question: "Which module or behavior should the tests cover?",
};

static OPTIMIZATION: CategoryTemplate = CategoryTemplate {
    success_criteria: &[
        "A measurable improvement against a recorded baseline",
        "Behavior is unchanged",
    ],
    constraints: &["Measure before and after every change"],
    steps: &[
        "Record a baseline measurement",
        "Profile to find the bottleneck",
        "Apply the optimization",
        "Measure again and compare",
    ],
    output_format: "code",
    output_description: "Optimized code with before and after measurements",
    output_structure: None,
    scope_question: "What metric should improve, and by how much?",
};

static SECURITY: CategoryTemplate = CategoryTemplate {
    success_criteria: &[
        "The vulnerability is no longer exploitable",
        "A test demonstrates the protection",
    ],
    constraints: &[
        "Do not log secrets or personal data",
        "Follow least-privilege access",
    ],
    steps: &[
        "Assess the threat and its impact",
        "Apply the mitigation",
        "Add a test for the attack case",
        "Review related code for the same weakness",
    ],
    output_format: "code",
    output_description: "A security fix with tests",
    output_structure: None,
    scope_question: "Which endpoints or data are exposed?",
};

static DEPLOYMENT: CategoryTemplate = CategoryTemplate {
    success_criteria: &[
        "The service deploys without manual steps",
        "A rollback path exists",
    ],
    constraints: &["No downtime for existing users"],
    steps: &[
        "Prepare the configuration",
        "Deploy to a staging environment",
        "Verify health checks",
        "Promote to production",
    ],
    output_format: "config",
    output_description: "Deployment configuration and runbook",
    output_structure: None,
    scope_question: "Which environment is the target?",
};

static GENERAL: CategoryTemplate = CategoryTemplate {
    success_criteria: &[
        "The task is completed as described",
        "The result is verified",
    ],
    constraints: &[],
    steps: &[
        "Clarify the requirements",
        "Carry out the task",
        "Verify the result",
    ],
    output_format: "text",
    output_description: "The completed task",
    output_structure: None,
    scope_question: "What does a finished result look like?",
};
