//! Typed generation on top of a plain-text [`LlmClient`]: the JSON schema of
//! the target type is appended to the prompt, and the reply is parsed back
//! into it.

use anyhow::{bail, Context, Result};
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::client::LlmClient;

/// Strip markdown code fences from output (```json ... ``` or ```...```)
pub fn strip_markdown_fences(content: &str) -> String {
    let trimmed = content.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6) {
        return content.to_string();
    }

    let inner = &trimmed[3..trimmed.len() - 3];
    // Drop the language tag on the opening fence, if any
    let inner = match inner.split_once('\n') {
        Some((tag, rest)) if !tag.trim().contains(' ') => rest,
        _ => inner,
    };
    inner.trim().to_string()
}

/// The outermost `{ ... }` span of a reply that may carry prose around it.
fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn schema_json<T: JsonSchema>() -> Result<String> {
    serde_json::to_string_pretty(&schema_for!(T)).context("Failed to serialize output schema")
}

/// Ask `client` for a `T`. Fails on transport errors, empty replies and
/// replies that do not parse as `T`.
pub async fn generate<T>(client: &dyn LlmClient, prompt: &str) -> Result<T>
where
    T: DeserializeOwned + JsonSchema,
{
    let full_prompt = format!(
        "{}\nRespond with a single JSON object that conforms to this JSON schema. Output only the JSON.\n\n{}\n",
        prompt,
        schema_json::<T>()?
    );

    let reply = client.complete(&full_prompt).await?;
    if reply.trim().is_empty() {
        bail!("Model returned an empty response");
    }

    let unfenced = strip_markdown_fences(&reply);
    let Some(json) = json_object_span(&unfenced) else {
        bail!("Model response contains no JSON object");
    };
    debug!("Parsing {} bytes of structured output", json.len());

    serde_json::from_str(json).context("Model response does not match the expected schema")
}
