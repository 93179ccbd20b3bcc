use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::types::{Severity, StructuredResult};
use crate::validator::QualityValidator;

/// Re-validate a stored result. Fails when the result has error-level issues.
pub fn run(path: &str) -> Result<()> {
    let file = Path::new(path);
    if !file.exists() {
        bail!("File not found: {}", path);
    }
    if !file.is_file() {
        bail!("Path is not a file: {}", path);
    }

    let content = fs::read_to_string(file)?;
    let result: StructuredResult = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a stored enhancement result", path))?;

    let validator = QualityValidator::new();
    let validation = validator.validate(&result);
    validator.print_issues(&validation);

    let errors = validation.count(Severity::Error);
    if errors > 0 {
        bail!("{} validation error(s) found", errors);
    }

    Ok(())
}
