//! Per-ecosystem manifest file discovery.
//!
//! Each ecosystem has a fixed priority order for which file on disk counts
//! as "the" manifest when more than one candidate exists (e.g. Gradle's
//! Groovy DSL is preferred over its Kotlin DSL twin when both are present,
//! matching Gradle's own resolution order).

use std::path::{Path, PathBuf};

use buildinfo_model::Ecosystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    PomXml,
    BuildGradle,
    CargoToml,
    Gemfile,
    PyProjectToml,
    ConanfileTxt,
    ConanfilePy,
    ChartYaml,
}

/// Locate the manifest file for `ecosystem` under `project_dir`, trying
/// each candidate in priority order and returning the first that exists.
pub fn discover_manifest(project_dir: &Path, ecosystem: Ecosystem) -> Option<(PathBuf, ManifestKind)> {
    let candidates: &[(&str, ManifestKind)] = match ecosystem {
        Ecosystem::Maven => &[("pom.xml", ManifestKind::PomXml)],
        Ecosystem::Gradle => &[
            ("build.gradle", ManifestKind::BuildGradle),
            ("build.gradle.kts", ManifestKind::BuildGradle),
        ],
        Ecosystem::Cargo => &[("Cargo.toml", ManifestKind::CargoToml)],
        Ecosystem::Bundler => &[("Gemfile", ManifestKind::Gemfile)],
        Ecosystem::Poetry => &[("pyproject.toml", ManifestKind::PyProjectToml)],
        Ecosystem::Conan => &[
            ("conanfile.txt", ManifestKind::ConanfileTxt),
            ("conanfile.py", ManifestKind::ConanfilePy),
        ],
        Ecosystem::Helm => &[("Chart.yaml", ManifestKind::ChartYaml)],
    };

    for (filename, kind) in candidates {
        let path = project_dir.join(filename);
        if path.is_file() {
            return Some((path, *kind));
        }
    }
    None
}

/// Locate the settings file that accompanies a Gradle build manifest
/// (`settings.gradle` preferred over `settings.gradle.kts`), used for
/// submodule discovery.
pub fn discover_gradle_settings(project_dir: &Path) -> Option<PathBuf> {
    for filename in ["settings.gradle", "settings.gradle.kts"] {
        let path = project_dir.join(filename);
        if path.is_file() {
            return Some(path);
        }
    }
    None
}

/// Locate the lockfile that accompanies a manifest, if the ecosystem has
/// one.
pub fn discover_lockfile(project_dir: &Path, ecosystem: Ecosystem) -> Option<PathBuf> {
    let filename = match ecosystem {
        Ecosystem::Maven => return None,
        Ecosystem::Gradle => return None,
        Ecosystem::Cargo => "Cargo.lock",
        Ecosystem::Bundler => "Gemfile.lock",
        Ecosystem::Poetry => "poetry.lock",
        Ecosystem::Conan => return None,
        Ecosystem::Helm => "Chart.lock",
    };
    let path = project_dir.join(filename);
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_groovy_gradle_over_kotlin() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("build.gradle"), "").unwrap();
        std::fs::write(tmp.path().join("build.gradle.kts"), "").unwrap();

        let (path, kind) = discover_manifest(tmp.path(), Ecosystem::Gradle).unwrap();
        assert_eq!(path.file_name().unwrap(), "build.gradle");
        assert_eq!(kind, ManifestKind::BuildGradle);
    }

    #[test]
    fn falls_back_to_kotlin_gradle_when_groovy_absent() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("build.gradle.kts"), "").unwrap();

        let (path, _) = discover_manifest(tmp.path(), Ecosystem::Gradle).unwrap();
        assert_eq!(path.file_name().unwrap(), "build.gradle.kts");
    }

    #[test]
    fn returns_none_when_no_manifest_present() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(discover_manifest(tmp.path(), Ecosystem::Cargo).is_none());
    }

    #[test]
    fn conan_prefers_txt_over_py() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("conanfile.txt"), "").unwrap();
        std::fs::write(tmp.path().join("conanfile.py"), "").unwrap();

        let (_, kind) = discover_manifest(tmp.path(), Ecosystem::Conan).unwrap();
        assert_eq!(kind, ManifestKind::ConanfileTxt);
    }
}
