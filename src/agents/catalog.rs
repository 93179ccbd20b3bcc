use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::BoundedCache;
use crate::error::{or_empty, Ignored};
use crate::types::AgentIdentity;

/// The helper identities available for mention resolution, in catalog order.
///
/// Catalog order is the order documents were discovered: sorted by file path.
/// When a loose mention matches several entries, the earliest one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentCatalog {
    entries: Vec<AgentIdentity>,
}

impl AgentCatalog {
    /// Build a catalog, dropping later entries whose name (case-insensitive)
    /// was already seen.
    pub fn from_entries(entries: Vec<AgentIdentity>) -> Self {
        let mut seen = Vec::new();
        let mut kept = Vec::new();
        for entry in entries {
            let key = entry.name.to_lowercase();
            if entry.name.trim().is_empty() || seen.contains(&key) {
                debug!("Skipping duplicate or unnamed agent from {:?}", entry.source);
                continue;
            }
            seen.push(key);
            kept.push(entry);
        }
        Self { entries: kept }
    }

    /// Load every `*.md` identity document from `dir`.
    ///
    /// Unreadable or name-less documents are skipped; only a missing or
    /// unreadable directory is reported.
    pub fn load(dir: &Path) -> Result<Self, Ignored> {
        let read_dir = fs::read_dir(dir).map_err(|e| Ignored::io(dir, e))?;

        let mut paths: Vec<PathBuf> = read_dir
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "md"))
            .collect();
        paths.sort();

        let mut entries = Vec::new();
        for path in paths {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    Ignored::io(&path, e).log("agent document");
                    continue;
                }
            };
            match parse_identity(&content, &path) {
                Ok(identity) => entries.push(identity),
                Err(ignored) => ignored.log("agent document"),
            }
        }

        let catalog = Self::from_entries(entries);
        info!("Loaded {} agents from {}", catalog.len(), dir.display());
        Ok(catalog)
    }

    pub fn entries(&self) -> &[AgentIdentity] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&AgentIdentity> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a `---` delimited frontmatter block into key/value pairs.
fn extract_frontmatter(content: &str) -> HashMap<String, String> {
    let mut frontmatter = HashMap::new();

    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() || !lines[0].trim_start_matches('\u{feff}').starts_with("---") {
        return frontmatter;
    }

    let mut in_frontmatter = false;
    for line in lines {
        if line.trim().trim_start_matches('\u{feff}') == "---" {
            if in_frontmatter {
                break; // End of frontmatter
            }
            in_frontmatter = true;
            continue;
        }

        if in_frontmatter {
            if let Some((key, value)) = line.split_once(':') {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                frontmatter.insert(key.trim().to_string(), value.to_string());
            }
        }
    }

    frontmatter
}

fn parse_identity(content: &str, path: &Path) -> Result<AgentIdentity, Ignored> {
    let frontmatter = extract_frontmatter(content);
    let name = frontmatter
        .get("name")
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Ignored::parse(path, "frontmatter has no 'name' field"))?;

    Ok(AgentIdentity {
        name: name.to_string(),
        description: frontmatter.get("description").cloned().unwrap_or_default(),
        source: path.to_path_buf(),
    })
}

/// Loads catalogs once per directory and keeps them in a bounded cache.
#[derive(Clone)]
pub struct CatalogLoader {
    cache: BoundedCache<PathBuf, Arc<AgentCatalog>>,
}

impl CatalogLoader {
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: BoundedCache::new(capacity),
        }
    }

    /// Catalog for `dir`; an absent or unreadable directory yields an empty
    /// catalog.
    pub fn load(&self, dir: &Path) -> Arc<AgentCatalog> {
        self.cache.get_or_insert_with(dir.to_path_buf(), || {
            Arc::new(or_empty(AgentCatalog::load(dir), "agent catalog"))
        })
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new(crate::cache::DEFAULT_CAPACITY)
    }
}
