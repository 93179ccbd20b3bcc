use anyhow::{bail, Result};

use crate::classifier::WorkflowClassifier;

pub fn run(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Nothing to classify: text is empty");
    }

    let classifier = WorkflowClassifier::new();
    println!("{}", classifier.classify(text, None));

    let mut scores: Vec<_> = classifier
        .scores(text)
        .into_iter()
        .filter(|(_, score)| *score > 0)
        .collect();
    scores.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    for (category, score) in scores {
        println!("  {:<14} {}", category.as_str(), score);
    }

    Ok(())
}
