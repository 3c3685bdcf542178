//! Per-ecosystem submodule discovery: deciding how many `Module` entries a
//! `BuildInfo` document should contain for a single checkout.

use std::path::{Path, PathBuf};

use buildinfo_manifest::gradle::parse_include_statements;
use buildinfo_manifest::helm::parse_chart_yaml;
use buildinfo_model::Ecosystem;

/// A discovered submodule: its id path fragment and its directory on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmodulePath {
    pub name: String,
    pub dir: PathBuf,
}

/// Enumerate the submodules of `project_dir` for `ecosystem`. Returns an
/// empty vector for a single-module project (the common case) rather than
/// treating that as an error.
pub fn discover_submodules(project_dir: &Path, ecosystem: Ecosystem) -> Vec<SubmodulePath> {
    match ecosystem {
        Ecosystem::Gradle => gradle_submodules(project_dir),
        Ecosystem::Cargo => cargo_submodules(project_dir),
        Ecosystem::Helm => helm_submodules(project_dir),
        // Conan's submodule model is one recipe producing multiple binary
        // packages rather than a directory tree of child projects; there is
        // no local-path signal to enumerate here the way there is for the
        // other four ecosystems.
        Ecosystem::Conan => Vec::new(),
        Ecosystem::Maven => maven_submodules(project_dir),
        Ecosystem::Bundler | Ecosystem::Poetry => Vec::new(),
    }
}

fn maven_submodules(project_dir: &Path) -> Vec<SubmodulePath> {
    let pom_path = project_dir.join("pom.xml");
    let Ok(contents) = std::fs::read_to_string(&pom_path) else {
        return Vec::new();
    };
    let Ok(pom) = buildinfo_manifest::pom::parse_pom(&contents) else {
        return Vec::new();
    };

    pom.modules
        .into_iter()
        .map(|module| SubmodulePath {
            dir: project_dir.join(&module),
            name: module,
        })
        .collect()
}

fn gradle_submodules(project_dir: &Path) -> Vec<SubmodulePath> {
    let settings = ["settings.gradle", "settings.gradle.kts"]
        .iter()
        .map(|f| project_dir.join(f))
        .find(|p| p.is_file());

    let Some(settings_path) = settings else {
        return Vec::new();
    };
    let Ok(contents) = std::fs::read_to_string(&settings_path) else {
        return Vec::new();
    };
    let Ok(modules) = parse_include_statements(&contents) else {
        return Vec::new();
    };

    modules
        .into_iter()
        .map(|gradle_path| {
            let relative = gradle_path.trim_start_matches(':').replace(':', "/");
            SubmodulePath {
                dir: project_dir.join(&relative),
                name: gradle_path,
            }
        })
        .collect()
}

fn cargo_submodules(project_dir: &Path) -> Vec<SubmodulePath> {
    let manifest_path = project_dir.join("Cargo.toml");
    let Ok(contents) = std::fs::read_to_string(&manifest_path) else {
        return Vec::new();
    };
    let Ok(manifest) = buildinfo_manifest::cargo::parse_cargo_toml(&contents) else {
        return Vec::new();
    };
    let Some(workspace) = manifest.workspace else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for pattern in &workspace.members {
        if pattern.contains('*') {
            out.extend(expand_member_glob(project_dir, pattern));
        } else {
            let dir = project_dir.join(pattern);
            if dir.join("Cargo.toml").is_file() {
                out.push(SubmodulePath {
                    name: pattern.clone(),
                    dir,
                });
            }
        }
    }
    out
}

/// Expand a glob like `crates/*` by matching it against the immediate
/// children of the pattern's fixed prefix directory. Only a single `*`
/// segment is supported, matching every workspace glob observed in
/// practice (`crates/*`, `libs/*`).
fn expand_member_glob(project_dir: &Path, pattern: &str) -> Vec<SubmodulePath> {
    let Ok(glob) = globset::Glob::new(pattern) else {
        return Vec::new();
    };
    let matcher = glob.compile_matcher();

    let prefix = pattern.split('*').next().unwrap_or("");
    let scan_dir = project_dir.join(prefix.trim_end_matches('/'));
    let Ok(entries) = std::fs::read_dir(&scan_dir) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Ok(relative) = path.strip_prefix(project_dir) else {
            continue;
        };
        if matcher.is_match(relative) && path.join("Cargo.toml").is_file() {
            out.push(SubmodulePath {
                name: relative.to_string_lossy().to_string(),
                dir: path,
            });
        }
    }
    out
}

fn helm_submodules(project_dir: &Path) -> Vec<SubmodulePath> {
    let chart_path = project_dir.join("Chart.yaml");
    let Ok(contents) = std::fs::read_to_string(&chart_path) else {
        return Vec::new();
    };
    let Ok(chart) = parse_chart_yaml(&contents) else {
        return Vec::new();
    };

    chart
        .dependencies
        .into_iter()
        .filter(|dep| dep.is_local())
        .filter_map(|dep| {
            let repo = dep.repository.as_deref()?;
            let relative = repo.strip_prefix("file://")?;
            Some(SubmodulePath {
                name: dep.name,
                dir: project_dir.join(relative),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_module_project_has_no_submodules() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(discover_submodules(tmp.path(), Ecosystem::Maven).is_empty());
    }

    #[test]
    fn cargo_expands_glob_workspace_members() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("Cargo.toml"),
            "[workspace]\nmembers = [\"crates/*\"]\n",
        )
        .unwrap();
        for name in ["a", "b"] {
            let dir = tmp.path().join("crates").join(name);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("Cargo.toml"), "[package]\nname = \"x\"\n").unwrap();
        }

        let mut found = cargo_submodules(tmp.path());
        found.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(found.len(), 2);
        assert!(found[0].name.ends_with('a'));
    }

    #[test]
    fn maven_submodules_read_from_modules_element() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("pom.xml"),
            r#"<project>
                <groupId>com.example</groupId>
                <artifactId>parent</artifactId>
                <version>1.0.0</version>
                <packaging>pom</packaging>
                <modules>
                    <module>core</module>
                    <module>web</module>
                </modules>
            </project>"#,
        )
        .unwrap();

        let found = maven_submodules(tmp.path());
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].dir, tmp.path().join("core"));
    }

    #[test]
    fn gradle_submodules_map_colon_paths_to_directories() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("settings.gradle"),
            "include ':app', ':lib:core'\n",
        )
        .unwrap();

        let found = gradle_submodules(tmp.path());
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].dir, tmp.path().join("lib/core"));
    }
}
