//! `pyproject.toml` / `poetry.lock` reading.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use buildinfo_util::errors::BuildInfoError;

#[derive(Debug, Clone, Deserialize)]
pub struct PyProjectToml {
    pub tool: Option<ToolSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolSection {
    pub poetry: Option<PoetrySection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoetrySection {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, toml::Value>,
    /// `[tool.poetry.group.<name>.dependencies]` — dev/test dependency
    /// groups introduced in Poetry 1.2. Older projects instead use a
    /// top-level `dev-dependencies` table, which this struct does not model
    /// separately since it is deprecated upstream.
    #[serde(default, rename = "group")]
    pub groups: BTreeMap<String, DependencyGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DependencyGroup {
    #[serde(default)]
    pub dependencies: BTreeMap<String, toml::Value>,
}

pub fn parse_pyproject_toml(contents: &str) -> Result<PyProjectToml, BuildInfoError> {
    toml::from_str(contents).map_err(|e| BuildInfoError::ManifestMalformed {
        message: format!("failed to parse pyproject.toml: {e}"),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedPythonPackage {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawPoetryLock {
    #[serde(default)]
    package: Vec<RawLockedPackage>,
}

#[derive(Debug, Deserialize)]
struct RawLockedPackage {
    name: String,
    version: String,
    #[serde(default)]
    dependencies: BTreeMap<String, toml::Value>,
}

pub fn parse_poetry_lock(contents: &str) -> Result<Vec<LockedPythonPackage>, BuildInfoError> {
    let raw: RawPoetryLock = toml::from_str(contents).map_err(|e| BuildInfoError::ManifestMalformed {
        message: format!("failed to parse poetry.lock: {e}"),
    })?;

    Ok(raw
        .package
        .into_iter()
        .map(|p| LockedPythonPackage {
            name: p.name,
            version: p.version,
            dependencies: p.dependencies.into_keys().collect(),
        })
        .collect())
}

pub fn read_pyproject(path: &Path) -> Result<PyProjectToml, BuildInfoError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BuildInfoError::ManifestMissing {
                path: path.to_path_buf(),
            }
        } else {
            BuildInfoError::Io(e)
        }
    })?;
    parse_pyproject_toml(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_poetry_dependencies_table() {
        let toml = r#"
[tool.poetry]
name = "demo"
version = "0.1.0"

[tool.poetry.dependencies]
python = "^3.10"
requests = "^2.31"

[tool.poetry.group.dev.dependencies]
pytest = "^8.0"
"#;
        let parsed = parse_pyproject_toml(toml).unwrap();
        let poetry = parsed.tool.unwrap().poetry.unwrap();
        assert_eq!(poetry.name.as_deref(), Some("demo"));
        assert!(poetry.dependencies.contains_key("requests"));
        assert!(poetry.groups["dev"].dependencies.contains_key("pytest"));
    }

    #[test]
    fn parses_poetry_lock_with_transitive_deps() {
        let lock = r#"
[[package]]
name = "requests"
version = "2.31.0"

[package.dependencies]
certifi = ">=2017.4.17"
idna = ">=2.5,<4"

[[package]]
name = "certifi"
version = "2024.2.2"
"#;
        let packages = parse_poetry_lock(lock).unwrap();
        assert_eq!(packages.len(), 2);
        let requests = packages.iter().find(|p| p.name == "requests").unwrap();
        assert_eq!(requests.dependencies.len(), 2);
    }
}
