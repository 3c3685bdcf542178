//! Helm `Chart.yaml` / `Chart.lock` reading.

use std::path::Path;

use serde::Deserialize;

use buildinfo_util::errors::BuildInfoError;

#[derive(Debug, Clone, Deserialize)]
pub struct ChartYaml {
    pub name: String,
    pub version: String,
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    #[serde(default)]
    pub dependencies: Vec<ChartDependency>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartDependency {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub repository: Option<String>,
    /// `condition`/`tags`/local `file://` paths are all recorded under
    /// `repository` by Helm's own Chart.yaml schema; a `file://` prefix
    /// marks a local subchart rather than a repository fetch.
    #[serde(default)]
    pub alias: Option<String>,
}

impl ChartDependency {
    pub fn is_local(&self) -> bool {
        self.repository
            .as_deref()
            .map(|r| r.starts_with("file://"))
            .unwrap_or(false)
    }
}

pub fn parse_chart_yaml(contents: &str) -> Result<ChartYaml, BuildInfoError> {
    serde_yaml::from_str(contents).map_err(|e| BuildInfoError::ManifestMalformed {
        message: format!("failed to parse Chart.yaml: {e}"),
    })
}

/// One locked dependency entry from `Chart.lock`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartLock {
    pub dependencies: Vec<LockedChartDependency>,
    pub digest: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LockedChartDependency {
    pub name: String,
    pub repository: String,
    pub version: String,
}

pub fn parse_chart_lock(contents: &str) -> Result<ChartLock, BuildInfoError> {
    serde_yaml::from_str(contents).map_err(|e| BuildInfoError::ManifestMalformed {
        message: format!("failed to parse Chart.lock: {e}"),
    })
}

pub fn read_chart(path: &Path) -> Result<ChartYaml, BuildInfoError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BuildInfoError::ManifestMissing {
                path: path.to_path_buf(),
            }
        } else {
            BuildInfoError::Io(e)
        }
    })?;
    parse_chart_yaml(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART_YAML: &str = r#"
apiVersion: v2
name: my-app
version: 1.2.3
dependencies:
  - name: postgresql
    version: "12.5.6"
    repository: "https://charts.bitnami.com/bitnami"
  - name: common
    version: "1.0.0"
    repository: "file://../common"
"#;

    #[test]
    fn parses_chart_yaml_with_dependencies() {
        let chart = parse_chart_yaml(CHART_YAML).unwrap();
        assert_eq!(chart.name, "my-app");
        assert_eq!(chart.dependencies.len(), 2);
        assert!(!chart.dependencies[0].is_local());
        assert!(chart.dependencies[1].is_local());
    }

    #[test]
    fn parses_chart_lock() {
        let lock = r#"
dependencies:
  - name: postgresql
    repository: "https://charts.bitnami.com/bitnami"
    version: "12.5.6"
digest: "sha256:abcdef"
"#;
        let parsed = parse_chart_lock(lock).unwrap();
        assert_eq!(parsed.dependencies.len(), 1);
        assert_eq!(parsed.dependencies[0].version, "12.5.6");
    }

    #[test]
    fn malformed_yaml_returns_manifest_malformed() {
        let result = parse_chart_yaml("name: [unterminated");
        assert!(matches!(result, Err(BuildInfoError::ManifestMalformed { .. })));
    }
}
