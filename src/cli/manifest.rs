//! Project manifest reader (spec §6): a simple declarative file naming a
//! project, listing source directories, and selecting a target. Read only
//! by the CLI; the core pipeline never parses this and only ever sees the
//! source-path lists it resolves to.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub package: Package,
    #[serde(default)]
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    #[serde(default = "default_target")]
    pub target: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig { sources: default_sources(), target: default_target() }
    }
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_sources() -> Vec<String> {
    vec!["src".to_string()]
}

fn default_target() -> String {
    "csharp".to_string()
}

#[derive(Debug)]
pub enum ManifestError {
    Io(PathBuf, String),
    Parse(PathBuf, String),
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestError::Io(path, e) => write!(f, "failed to read {}: {e}", path.display()),
            ManifestError::Parse(path, e) => write!(f, "failed to parse {}: {e}", path.display()),
        }
    }
}

impl std::error::Error for ManifestError {}

impl Manifest {
    /// Loads `Cadenza.toml` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, ManifestError> {
        let path = dir.join("Cadenza.toml");
        let content = fs::read_to_string(&path).map_err(|e| ManifestError::Io(path.clone(), e.to_string()))?;
        toml::from_str(&content).map_err(|e| ManifestError::Parse(path, e.to_string()))
    }

    /// Resolves the manifest's source directories under `project_dir` to
    /// every `.cdz` file they contain. Errors in one directory don't stop
    /// the others from being scanned.
    pub fn source_files(&self, project_dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for source_dir in &self.build.sources {
            let dir = project_dir.join(source_dir);
            let Ok(entries) = fs::read_dir(&dir) else { continue };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("cdz") {
                    files.push(path);
                }
            }
        }
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_manifest() {
        let manifest: Manifest = toml::from_str("[package]\nname = \"demo\"\n").unwrap();
        assert_eq!(manifest.package.name, "demo");
        assert_eq!(manifest.package.version, "0.1.0");
        assert_eq!(manifest.build.target, "csharp");
        assert_eq!(manifest.build.sources, vec!["src".to_string()]);
    }

    #[test]
    fn parses_full_manifest() {
        let toml = r#"
[package]
name = "demo"
version = "2.0.0"

[build]
sources = ["src", "modules"]
target = "csharp"
"#;
        let manifest: Manifest = toml::from_str(toml).unwrap();
        assert_eq!(manifest.package.version, "2.0.0");
        assert_eq!(manifest.build.sources, vec!["src".to_string(), "modules".to_string()]);
    }
}
