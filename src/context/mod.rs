//! Ranks project files and dependencies by lexical overlap with a prompt.
//!
//! Two independent sub-analyses feed a [`ContextBundle`]: a file scan under
//! the analyzer root and a manifest read for dependencies and tech-stack
//! tags. Either one can fail without failing the call; the failure is logged
//! and contributes an empty list.

pub mod keywords;

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cache::BoundedCache;
use crate::detector;
use crate::error::{or_empty, Ignored};
use crate::types::{ContextBundle, RelevantFile};
use crate::util::char_prefix;

pub use keywords::extract_keywords;

/// Characters of the prompt used as the cache key.
pub const CACHE_KEY_CHARS: usize = 50;

/// Directories never descended into.
pub const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    "coverage",
    "vendor",
    ".git",
    ".hg",
    ".svn",
    ".next",
    ".nuxt",
    ".turbo",
    ".cache",
    ".venv",
    "venv",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".idea",
    ".vscode",
];

/// Extensions considered source (or source-adjacent) files.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "ts", "tsx", "js", "jsx", "mjs", "cjs", "py", "go", "java", "kt", "rb", "php", "cs",
    "swift", "c", "h", "cpp", "hpp", "vue", "svelte", "css", "scss", "html", "sql", "sh", "md",
    "mdx", "json", "toml", "yaml", "yml", "graphql", "prisma",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Hard cap on relevant files collected during the walk
    pub max_files: usize,
    /// Files kept in the returned bundle
    pub display_files: usize,
    /// Files larger than this are skipped
    pub max_file_bytes: u64,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            max_files: 20,
            display_files: 10,
            max_file_bytes: 1024 * 1024,
        }
    }
}

pub struct ContextAnalyzer {
    root: PathBuf,
    options: ContextOptions,
    cache: BoundedCache<String, ContextBundle>,
}

impl ContextAnalyzer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            options: ContextOptions::default(),
            cache: BoundedCache::default(),
        }
    }

    pub fn with_options(mut self, options: ContextOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cache(mut self, cache: BoundedCache<String, ContextBundle>) -> Self {
        self.cache = cache;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Context for `text`, served from the cache when a prompt with the same
    /// leading characters was analyzed before.
    pub fn analyze(&self, text: &str) -> ContextBundle {
        let key = char_prefix(text.trim(), CACHE_KEY_CHARS).to_string();
        if let Some(hit) = self.cache.get(&key) {
            debug!("Context cache hit for '{}'", key);
            return hit;
        }
        let bundle = self.analyze_uncached(text);
        self.cache.insert(key, bundle.clone());
        bundle
    }

    pub fn analyze_uncached(&self, text: &str) -> ContextBundle {
        let keywords = extract_keywords(text);
        debug!("Context keywords: {:?}", keywords);

        let relevant_files = or_empty(self.scan_files(&keywords), "file scan");
        let manifest = or_empty(detector::read_manifest(&self.root), "manifest");
        let tech_stack = detector::detect_tech_stack(&manifest, &self.root);

        info!(
            "Context: {} relevant files, {} dependencies, {} tech tags",
            relevant_files.len(),
            manifest.dependencies.len(),
            tech_stack.len()
        );

        ContextBundle {
            relevant_files,
            dependencies: manifest.dependencies,
            tech_stack,
        }
    }

    /// Walk the root and return files whose relative path contains a keyword,
    /// ranked by the number of keywords matched.
    pub fn scan_files(&self, keywords: &[String]) -> Result<Vec<RelevantFile>, Ignored> {
        if !self.root.is_dir() {
            return Err(Ignored::Missing(self.root.clone()));
        }
        if keywords.is_empty() || self.options.max_files == 0 {
            return Ok(Vec::new());
        }

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(|entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && entry.depth() > 0 && is_ignored_dir(entry.file_name()))
            });

        let mut hits: Vec<(usize, RelevantFile)> = Vec::new();
        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            if !has_source_extension(path) {
                continue;
            }
            if let Ok(metadata) = entry.metadata() {
                if metadata.len() > self.options.max_file_bytes {
                    debug!("Skipping large file {}", path.display());
                    continue;
                }
            }

            let relative = relative_path(path, &self.root);
            let lowered = relative.to_lowercase();
            let matched: Vec<&str> = keywords
                .iter()
                .filter(|k| lowered.contains(k.as_str()))
                .map(|k| k.as_str())
                .collect();
            if matched.is_empty() {
                continue;
            }

            let summary = summarize(&relative, &matched);
            hits.push((
                matched.len(),
                RelevantFile {
                    path: relative,
                    summary,
                },
            ));
            if hits.len() >= self.options.max_files {
                debug!("Reached relevant file cap ({})", self.options.max_files);
                break;
            }
        }

        // Stable: equal scores keep walk (path) order
        hits.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(hits
            .into_iter()
            .take(self.options.display_files)
            .map(|(_, file)| file)
            .collect())
    }
}

fn is_ignored_dir(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| IGNORED_DIRS.contains(&n))
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Root-relative path with forward slashes.
fn relative_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn file_kind(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    match ext.to_lowercase().as_str() {
        "rs" => "Rust source",
        "ts" | "tsx" => "TypeScript source",
        "js" | "jsx" | "mjs" | "cjs" => "JavaScript source",
        "py" => "Python source",
        "go" => "Go source",
        "vue" | "svelte" => "UI component",
        "css" | "scss" => "Stylesheet",
        "md" | "mdx" => "Documentation",
        "json" | "toml" | "yaml" | "yml" => "Configuration",
        "sql" | "prisma" | "graphql" => "Schema",
        "sh" => "Shell script",
        _ => "Source file",
    }
}

fn summarize(relative: &str, matched: &[&str]) -> String {
    let location = relative
        .rsplit_once('/')
        .map(|(dir, _)| format!(" in {}", dir))
        .unwrap_or_default();
    format!(
        "{}{} (matches: {})",
        file_kind(relative),
        location,
        matched.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "// content").unwrap();
    }

    #[test]
    fn test_summarize() {
        assert_eq!(
            summarize("src/auth/login.ts", &["login"]),
            "TypeScript source in src/auth (matches: login)"
        );
        assert_eq!(summarize("README.md", &["readme"]), "Documentation (matches: readme)");
    }

    #[test]
    fn test_ranked_by_keyword_count() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "src/login.rs");
        touch(tmp.path(), "src/auth/login_form.rs");
        touch(tmp.path(), "src/profile.rs");

        let analyzer = ContextAnalyzer::new(tmp.path());
        let files = analyzer
            .scan_files(&["login".to_string(), "form".to_string()])
            .unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/auth/login_form.rs", "src/login.rs"]);
    }

    #[test]
    fn test_skips_non_source_and_large_files() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "assets/login.png");
        fs::write(tmp.path().join("login.rs"), "x".repeat(64)).unwrap();

        let analyzer = ContextAnalyzer::new(tmp.path()).with_options(ContextOptions {
            max_file_bytes: 16,
            ..ContextOptions::default()
        });
        assert!(analyzer.scan_files(&["login".to_string()]).unwrap().is_empty());
    }

    #[test]
    fn test_missing_root_is_ignored() {
        let analyzer = ContextAnalyzer::new("/nonexistent/project/root");
        assert!(matches!(
            analyzer.scan_files(&["login".to_string()]),
            Err(Ignored::Missing(_))
        ));
        assert_eq!(analyzer.analyze("fix the login"), ContextBundle::default());
    }

    #[test]
    fn test_cache_keyed_by_prefix() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "src/billing.rs");
        let analyzer = ContextAnalyzer::new(tmp.path());

        let prefix = "Update the billing module so invoices are rounded ";
        assert_eq!(prefix.chars().count(), CACHE_KEY_CHARS);
        let first = analyzer.analyze(&format!("{}correctly", prefix));
        assert_eq!(first.relevant_files.len(), 1);

        // Same first 50 chars: served from cache even though the tail differs
        touch(tmp.path(), "src/invoices.rs");
        let second = analyzer.analyze(&format!("{}and the invoices table", prefix));
        assert_eq!(first, second);
    }
}
