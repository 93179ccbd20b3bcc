//! Detects references to catalog agents in free text and rewrites them to the
//! canonical `@agent-{name}` token.
//!
//! Detection runs in two passes. The confirmed pass looks for every catalog
//! name verbatim (longest first). The loose pass catches paraphrases: `@name`,
//! `use NAME` / `with NAME`, and compound role names like `api-engineer`.
//! Loose candidates that are a strict substring of a confirmed name are
//! dropped, so "engineer" inside "nextjs-ui-api-engineer" is not counted twice.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::catalog::AgentCatalog;
use crate::types::{AgentIdentity, AmbiguousMention, MentionResolution};
use crate::util::is_name_char;

/// Substring matches shorter than this are too noisy ("api", "test").
const MIN_SUBSTRING_MATCH: usize = 6;

static LOOSE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"@([A-Za-z][A-Za-z0-9_-]*)",
        r"(?i)\b(?:use|with)\s+(?:the\s+)?([a-z][a-z0-9_-]*)",
        r"(?i)\b([a-z][a-z0-9_]*(?:-[a-z0-9_]+)*-(?:engineer|agent|specialist|expert|resolver|reviewer|architect|developer))\b",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static DIRECTIVE_TAIL: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:use|with)\s+(?:the\s+)?$").ok());

/// One identity attached to the resolution, with the surface text that
/// produced it.
#[derive(Debug, Clone)]
struct Attachment<'a> {
    position: usize,
    mention: String,
    identity: &'a AgentIdentity,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AgentMentionResolver;

impl AgentMentionResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, text: &str, catalog: &AgentCatalog) -> MentionResolution {
        if catalog.is_empty() || text.trim().is_empty() {
            return MentionResolution {
                original: text.to_string(),
                processed: text.to_string(),
                ..MentionResolution::default()
            };
        }

        let lowered = text.to_ascii_lowercase();
        let mut attached: Vec<Attachment> = Vec::new();
        let mut ambiguities = Vec::new();

        // Pass 1: verbatim catalog names, most specific first
        let mut by_length: Vec<&AgentIdentity> = catalog.entries().iter().collect();
        by_length.sort_by_key(|identity| std::cmp::Reverse(identity.name.len()));

        let mut confirmed_spans: Vec<(usize, usize)> = Vec::new();
        let mut confirmed_names: Vec<String> = Vec::new();
        for identity in by_length {
            let name = identity.name.to_ascii_lowercase();
            for start in find_bounded(&lowered, &name, true) {
                let end = start + name.len();
                let enclosed = confirmed_spans
                    .iter()
                    .any(|&(s, e)| s <= start && end <= e && (s, e) != (start, end));
                if enclosed {
                    continue;
                }
                confirmed_spans.push((start, end));
                if !confirmed_names.contains(&name) {
                    confirmed_names.push(name.clone());
                    attached.push(Attachment {
                        position: start,
                        mention: name.clone(),
                        identity,
                    });
                }
            }
        }

        // Pass 2: loose patterns
        for pattern in LOOSE_PATTERNS.iter() {
            for caps in pattern.captures_iter(text) {
                let Some(m) = caps.get(1) else { continue };
                let Some(candidate) = clean_candidate(m.as_str()) else {
                    continue;
                };

                let inside_confirmed = confirmed_names
                    .iter()
                    .any(|name| name.contains(candidate.as_str()));
                if inside_confirmed {
                    continue;
                }

                let Some((identity, candidates)) = match_catalog(&candidate, catalog) else {
                    continue;
                };
                let already_flagged = ambiguities
                    .iter()
                    .any(|a: &AmbiguousMention| a.mention == candidate);
                if candidates.len() > 1 && !already_flagged {
                    warn!(
                        "Ambiguous agent mention '{}' matches {:?}; using '{}'",
                        candidate, candidates, identity.name
                    );
                    ambiguities.push(AmbiguousMention {
                        mention: candidate.clone(),
                        candidates,
                        chosen: identity.name.clone(),
                    });
                }
                if attached.iter().any(|a| a.identity.name == identity.name) {
                    continue;
                }
                debug!("Loose mention '{}' resolved to {}", candidate, identity.name);
                attached.push(Attachment {
                    position: m.start(),
                    mention: candidate,
                    identity,
                });
            }
        }

        attached.sort_by_key(|a| a.position);

        let mut processed = text.to_string();
        for attachment in &attached {
            if !rewrite_first(&mut processed, &attachment.mention, attachment.identity) {
                debug!(
                    "Mention '{}' of {} left as written",
                    attachment.mention, attachment.identity.name
                );
            }
        }

        MentionResolution {
            original: text.to_string(),
            processed,
            agents: attached.iter().map(|a| a.identity.clone()).collect(),
            ambiguities,
        }
    }
}

/// Normalize a loose capture: lower-case, strip trailing separators and the
/// `agent-` prefix of an already-canonical token.
fn clean_candidate(raw: &str) -> Option<String> {
    let lowered = raw.to_ascii_lowercase();
    let stripped = lowered
        .strip_prefix("agent-")
        .unwrap_or(&lowered)
        .trim_end_matches(['-', '_']);
    if stripped.is_empty() {
        return None;
    }
    Some(stripped.to_string())
}

/// Match a mention against the catalog: exact name, then a catalog name that
/// contains the mention (long mentions only), then a catalog name that has the
/// mention as a hyphen-delimited prefix. Returns the chosen identity and every
/// candidate of the winning rule.
fn match_catalog<'a>(
    mention: &str,
    catalog: &'a AgentCatalog,
) -> Option<(&'a AgentIdentity, Vec<String>)> {
    if let Some(identity) = catalog.get(mention) {
        return Some((identity, vec![identity.name.clone()]));
    }

    let containing: Vec<&AgentIdentity> = if mention.len() >= MIN_SUBSTRING_MATCH {
        catalog
            .entries()
            .iter()
            .filter(|e| e.name.to_ascii_lowercase().contains(mention))
            .collect()
    } else {
        Vec::new()
    };
    if let Some(first) = containing.first() {
        return Some((*first, containing.iter().map(|e| e.name.clone()).collect()));
    }

    let prefix = format!("{}-", mention);
    let prefixed: Vec<&AgentIdentity> = catalog
        .entries()
        .iter()
        .filter(|e| e.name.to_ascii_lowercase().starts_with(&prefix))
        .collect();
    prefixed
        .first()
        .map(|first| (*first, prefixed.iter().map(|e| e.name.clone()).collect()))
}

/// Byte offsets of `needle` in `haystack` (both ASCII-lowercased) that are not
/// glued to surrounding name characters. With `allow_at` false, an occurrence
/// directly after `@` is skipped.
fn find_bounded(haystack: &str, needle: &str, allow_at: bool) -> Vec<usize> {
    if needle.is_empty() {
        return Vec::new();
    }
    haystack
        .match_indices(needle)
        .map(|(start, _)| start)
        .filter(|&start| {
            let before = haystack[..start].chars().next_back();
            let after = haystack[start + needle.len()..].chars().next();
            let before_ok = match before {
                None => true,
                Some('@') => allow_at,
                Some(c) => !is_name_char(c),
            };
            before_ok && after.is_none_or(|c| !is_name_char(c))
        })
        .collect()
}

/// Rewrite the first occurrence of `mention` to the canonical token, using
/// the most specific surface form available: `@mention`, then
/// `use/with mention`, then the bare mention.
fn rewrite_first(processed: &mut String, mention: &str, identity: &AgentIdentity) -> bool {
    let token = identity.canonical_token();
    let lowered = processed.to_ascii_lowercase();
    if lowered.contains(&token.to_ascii_lowercase()) {
        return false;
    }

    let at_form = format!("@{}", mention);
    if let Some(&start) = find_bounded(&lowered, &at_form, false).first() {
        processed.replace_range(start..start + at_form.len(), &token);
        return true;
    }

    let bare = find_bounded(&lowered, mention, false);
    if let Some(directive) = DIRECTIVE_TAIL.as_ref() {
        if let Some(&start) = bare
            .iter()
            .find(|&&start| directive.is_match(&processed[..start]))
        {
            processed.replace_range(start..start + mention.len(), &token);
            return true;
        }
    }

    if let Some(&start) = bare.first() {
        processed.replace_range(start..start + mention.len(), &token);
        return true;
    }

    false
}
