use std::fs;
use std::path::Path;

use crate::error::Ignored;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ecosystem {
    Node,
    Rust,
    Python,
}

impl Ecosystem {
    pub fn as_str(&self) -> &str {
        match self {
            Ecosystem::Node => "node",
            Ecosystem::Rust => "rust",
            Ecosystem::Python => "python",
        }
    }

    pub fn manifest_file(&self) -> &'static str {
        match self {
            Ecosystem::Node => "package.json",
            Ecosystem::Rust => "Cargo.toml",
            Ecosystem::Python => "pyproject.toml",
        }
    }

    /// Tech-stack tag for the ecosystem itself.
    pub fn tag(&self) -> &'static str {
        match self {
            Ecosystem::Node => "Node.js",
            Ecosystem::Rust => "Rust",
            Ecosystem::Python => "Python",
        }
    }
}

/// Technology tag → dependency-name fragments that imply it.
pub const TECH_TAGS: &[(&str, &[&str])] = &[
    // Web frameworks
    ("Next.js", &["next"]),
    ("Express", &["express"]),
    ("Axum", &["axum"]),
    ("Actix", &["actix"]),
    ("Django", &["django"]),
    ("FastAPI", &["fastapi"]),
    ("Flask", &["flask"]),
    // UI libraries
    ("React", &["react"]),
    ("Vue", &["vue"]),
    ("Svelte", &["svelte"]),
    ("Tailwind CSS", &["tailwind"]),
    // ORMs / database
    ("Prisma", &["prisma"]),
    ("TypeORM", &["typeorm"]),
    ("Drizzle", &["drizzle"]),
    ("Mongoose", &["mongoose"]),
    ("SQLx", &["sqlx"]),
    ("Diesel", &["diesel"]),
    ("SQLAlchemy", &["sqlalchemy"]),
    // Type systems / validation
    ("TypeScript", &["typescript"]),
    ("Zod", &["zod"]),
    ("Pydantic", &["pydantic"]),
    ("Serde", &["serde"]),
    // Runtime / testing
    ("Tokio", &["tokio"]),
    ("Jest", &["jest"]),
    ("Vitest", &["vitest"]),
    ("Pytest", &["pytest"]),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub ecosystem: Option<Ecosystem>,
    pub dependencies: Vec<String>,
}

pub fn detect_ecosystem(path: &Path) -> Option<Ecosystem> {
    // Check manifests in order of how often they carry a usable dependency list
    [Ecosystem::Node, Ecosystem::Rust, Ecosystem::Python]
        .into_iter()
        .find(|eco| path.join(eco.manifest_file()).is_file())
}

/// Read the declared dependency names of the project at `root`.
pub fn read_manifest(root: &Path) -> Result<Manifest, Ignored> {
    let Some(ecosystem) = detect_ecosystem(root) else {
        return Err(Ignored::Missing(root.join("package.json")));
    };

    let path = root.join(ecosystem.manifest_file());
    let content = fs::read_to_string(&path).map_err(|e| Ignored::io(&path, e))?;

    let dependencies = match ecosystem {
        Ecosystem::Node => node_dependencies(&content),
        Ecosystem::Rust => cargo_dependencies(&content),
        Ecosystem::Python => python_dependencies(&content),
    }
    .map_err(|message| Ignored::parse(&path, message))?;

    Ok(Manifest {
        ecosystem: Some(ecosystem),
        dependencies: dedup_preserving_order(dependencies),
    })
}

fn node_dependencies(content: &str) -> Result<Vec<String>, String> {
    let json: serde_json::Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    let mut names = Vec::new();
    for section in ["dependencies", "devDependencies", "peerDependencies"] {
        if let Some(table) = json.get(section).and_then(|v| v.as_object()) {
            names.extend(table.keys().cloned());
        }
    }
    Ok(names)
}

fn cargo_dependencies(content: &str) -> Result<Vec<String>, String> {
    let table: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;
    let mut names = Vec::new();
    for section in ["dependencies", "dev-dependencies", "build-dependencies"] {
        if let Some(deps) = table.get(section).and_then(|v| v.as_table()) {
            names.extend(deps.keys().cloned());
        }
    }
    if let Some(deps) = table
        .get("workspace")
        .and_then(|w| w.get("dependencies"))
        .and_then(|v| v.as_table())
    {
        names.extend(deps.keys().cloned());
    }
    Ok(names)
}

fn python_dependencies(content: &str) -> Result<Vec<String>, String> {
    let table: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;
    let mut names = Vec::new();

    // PEP 621: [project] dependencies = ["fastapi>=0.100", ...]
    if let Some(deps) = table
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|v| v.as_array())
    {
        for spec in deps.iter().filter_map(|v| v.as_str()) {
            let name: String = spec
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
                .collect();
            if !name.is_empty() {
                names.push(name);
            }
        }
    }

    // Poetry: [tool.poetry.dependencies] fastapi = "^0.100"
    if let Some(deps) = table
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("dependencies"))
        .and_then(|v| v.as_table())
    {
        names.extend(deps.keys().filter(|k| *k != "python").cloned());
    }

    Ok(names)
}

fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for name in names {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

/// Tech-stack tags for a manifest: the ecosystem tag first, then every
/// [`TECH_TAGS`] entry whose fragment appears in a dependency name.
pub fn detect_tech_stack(manifest: &Manifest, root: &Path) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    if let Some(ecosystem) = manifest.ecosystem {
        tags.push(ecosystem.tag().to_string());
    }

    let lowered: Vec<String> = manifest
        .dependencies
        .iter()
        .map(|d| d.to_lowercase())
        .collect();
    for (tag, fragments) in TECH_TAGS {
        let hit = lowered
            .iter()
            .any(|dep| fragments.iter().any(|f| dep.contains(f)));
        if hit {
            tags.push(tag.to_string());
        }
    }

    // A tsconfig without a typescript dependency still means TypeScript
    if root.join("tsconfig.json").is_file() && !tags.iter().any(|t| t == "TypeScript") {
        tags.push("TypeScript".to_string());
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_node() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package.json"), "{}").unwrap();
        assert_eq!(detect_ecosystem(tmp.path()), Some(Ecosystem::Node));
    }

    #[test]
    fn test_detect_rust() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Cargo.toml"), "[package]\nname = \"test\"").unwrap();
        assert_eq!(detect_ecosystem(tmp.path()), Some(Ecosystem::Rust));
    }

    #[test]
    fn test_detect_python() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("pyproject.toml"), "[project]\nname = \"test\"").unwrap();
        assert_eq!(detect_ecosystem(tmp.path()), Some(Ecosystem::Python));
    }

    #[test]
    fn test_detect_unknown() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(detect_ecosystem(tmp.path()), None);
        assert!(matches!(read_manifest(tmp.path()), Err(Ignored::Missing(_))));
    }

    #[test]
    fn test_node_manifest_and_tags() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("package.json"),
            r#"{
  "name": "shop",
  "dependencies": { "next": "14.0.0", "react": "18.2.0", "@prisma/client": "5.0.0" },
  "devDependencies": { "typescript": "5.3.0", "react": "18.2.0" }
}"#,
        )
        .unwrap();

        let manifest = read_manifest(tmp.path()).unwrap();
        assert_eq!(
            manifest.dependencies,
            vec!["@prisma/client", "next", "react", "typescript"]
        );
        let tags = detect_tech_stack(&manifest, tmp.path());
        assert_eq!(tags, vec!["Node.js", "Next.js", "React", "Prisma", "TypeScript"]);
    }

    #[test]
    fn test_cargo_manifest_workspace_deps() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("Cargo.toml"),
            "[workspace.dependencies]\ntokio = \"1\"\n\n[dependencies]\naxum = \"0.7\"\nserde = { version = \"1\" }\n",
        )
        .unwrap();
        let manifest = read_manifest(tmp.path()).unwrap();
        assert_eq!(manifest.dependencies, vec!["axum", "serde", "tokio"]);
        let tags = detect_tech_stack(&manifest, tmp.path());
        assert_eq!(tags, vec!["Rust", "Axum", "Serde", "Tokio"]);
    }

    #[test]
    fn test_python_manifest_specs() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("pyproject.toml"),
            "[project]\nname = \"svc\"\ndependencies = [\"fastapi>=0.100\", \"SQLAlchemy[asyncio]~=2.0\"]\n\n[tool.poetry.dependencies]\npython = \"^3.11\"\npytest = \"*\"\n",
        )
        .unwrap();
        let manifest = read_manifest(tmp.path()).unwrap();
        assert_eq!(manifest.dependencies, vec!["fastapi", "SQLAlchemy", "pytest"]);
    }

    #[test]
    fn test_malformed_manifest_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package.json"), "{ not json").unwrap();
        assert!(matches!(read_manifest(tmp.path()), Err(Ignored::Parse { .. })));
    }

    #[test]
    fn test_tsconfig_implies_typescript() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("tsconfig.json"), "{}").unwrap();
        let tags = detect_tech_stack(&Manifest::default(), tmp.path());
        assert_eq!(tags, vec!["TypeScript"]);
    }
}
