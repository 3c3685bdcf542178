//! Per-ecosystem module resolution: native tool output preferred, a
//! declarative-manifest scan as the fallback when the tool can't run.
//!
//! Every resolver here returns a flat [`ParsedNode`] list; `build_module`
//! (in `assembler.rs`) is the single place that folds that list into a
//! [`DependencyStore`] and runs the Artifact Locator cascade over it.

use std::collections::HashMap;
use std::path::Path;

use buildinfo_model::{format_id, Ecosystem, Id, Scope};
use buildinfo_parsers::{
    bundler_graph, cargo_graph, conan_graph, gradle_fallback, gradle_tree, helm_graph, maven_tree,
    ParsedNode,
};
use buildinfo_process::{resolve_executable, run_tool, RunOptions};
use buildinfo_util::errors::BuildInfoError;

use crate::config::CollectConfig;

/// Build the Gradle project-path → Id map the Assembler hands to the tree
/// parser for resolving `project :a:b:c` references (spec §4.4/§4.8). Keyed
/// by each submodule's Gradle path (e.g. `":lib:core"`) as produced by
/// `discover_submodules`, plus a `""` entry carrying the root's own
/// group/version for the synthesize-when-unknown fallback.
///
/// Each module's identity is read directly from its own `build.gradle[.kts]`
/// (cheap, no tool invocation); a module missing a `group`/`version`
/// declaration inherits the root's.
pub fn build_gradle_module_map(module_dirs: &[(String, std::path::PathBuf)]) -> HashMap<String, Id> {
    let (root_group, root_version) = module_dirs
        .first()
        .and_then(|(_, dir)| read_gradle_identity(dir))
        .unwrap_or((None, None));
    let root_version = root_version.unwrap_or_else(|| "unspecified".to_string());

    let mut map = HashMap::new();
    map.insert(
        String::new(),
        Id(format_id(root_group.as_deref(), "root", &root_version, None)),
    );

    for (label, dir) in module_dirs.iter().skip(1) {
        let (group, version) = read_gradle_identity(dir).unwrap_or((None, None));
        let group = group.or_else(|| root_group.clone());
        let version = version.unwrap_or_else(|| root_version.clone());
        let name = label.rsplit(':').next().unwrap_or(label).to_string();
        map.insert(label.clone(), Id(format_id(group.as_deref(), &name, &version, None)));
    }

    map
}

fn read_gradle_identity(dir: &Path) -> Option<(Option<String>, Option<String>)> {
    for candidate in ["build.gradle", "build.gradle.kts"] {
        if let Ok(src) = std::fs::read_to_string(dir.join(candidate)) {
            return Some(buildinfo_manifest::gradle::parse_group_and_version(&src));
        }
    }
    None
}

/// The outcome of resolving one module's dependency set, plus whatever the
/// native tool run (if any) surfaced for the Artifact Locator cascade.
pub struct ModuleResolution {
    pub project_id: Id,
    pub nodes: Vec<ParsedNode>,
    /// Conan's `package_folder` shortcuts, keyed by dependency id, when the
    /// graph JSON carried them.
    pub known_paths: std::collections::HashMap<Id, std::path::PathBuf>,
}

pub async fn resolve(
    module_dir: &Path,
    cfg: &CollectConfig,
    gradle_modules: &HashMap<String, Id>,
) -> Result<ModuleResolution, BuildInfoError> {
    match cfg.ecosystem {
        Ecosystem::Maven => resolve_maven(module_dir, cfg).await,
        Ecosystem::Gradle => resolve_gradle(module_dir, cfg, gradle_modules).await,
        Ecosystem::Cargo => resolve_cargo(module_dir),
        Ecosystem::Bundler => resolve_bundler(module_dir),
        Ecosystem::Poetry => resolve_poetry(module_dir),
        Ecosystem::Conan => resolve_conan(module_dir, cfg).await,
        Ecosystem::Helm => resolve_helm(module_dir),
    }
}

fn no_known_paths() -> std::collections::HashMap<Id, std::path::PathBuf> {
    std::collections::HashMap::new()
}

async fn run_native(
    cfg: &CollectConfig,
    module_dir: &Path,
    tool_name: &str,
    args: &[&str],
) -> Option<String> {
    let executable = resolve_executable(cfg.executable_path.as_deref(), tool_name)?;
    let mut full_args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    full_args.extend(cfg.extra_args.iter().cloned());

    let opts = RunOptions {
        working_dir: module_dir.to_path_buf(),
        timeout: Some(cfg.command_timeout()),
        ..RunOptions::default()
    };
    let result = run_tool(&executable, &full_args, opts).await.ok()?;
    if !result.success() {
        tracing::warn!(tool = tool_name, "native tool exited non-zero, falling back to declarative parsing");
        return None;
    }
    Some(result.stdout.as_str_lossy())
}

async fn resolve_maven(
    module_dir: &Path,
    cfg: &CollectConfig,
) -> Result<ModuleResolution, BuildInfoError> {
    let pom_path = module_dir.join("pom.xml");
    let contents = std::fs::read_to_string(&pom_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BuildInfoError::ManifestMissing { path: pom_path.clone() }
        } else {
            BuildInfoError::Io(e)
        }
    })?;
    let pom = buildinfo_manifest::pom::parse_pom(&contents)?;
    let project_id = Id(buildinfo_model::format_id(
        pom.effective_group_id(),
        pom.artifact_id.as_deref().unwrap_or("unknown"),
        pom.effective_version().unwrap_or("0"),
        None,
    ));

    if let Some(output) = run_native(cfg, module_dir, "mvn", &["dependency:tree"]).await {
        let nodes = maven_tree::parse_maven_tree(&output);
        return Ok(ModuleResolution { project_id, nodes, known_paths: no_known_paths() });
    }

    tracing::debug!(module = %project_id, "mvn unavailable, reading pom.xml directly");
    let nodes = pom
        .dependencies
        .iter()
        .map(|dep| {
            let scope = Scope::map(Ecosystem::Maven, dep.scope.as_deref().unwrap_or("compile"));
            ParsedNode {
                id: Id(buildinfo_model::format_id(
                    Some(&dep.group_id),
                    &dep.artifact_id,
                    dep.version.as_deref().unwrap_or("unknown"),
                    dep.classifier.as_deref(),
                )),
                name: dep.artifact_id.clone(),
                version: dep.version.clone().unwrap_or_else(|| "unknown".into()),
                scope,
                parent_id: None,
                omitted_for_duplicate: false,
                checksum: None,
            }
        })
        .collect();

    Ok(ModuleResolution { project_id, nodes, known_paths: no_known_paths() })
}

async fn resolve_gradle(
    module_dir: &Path,
    cfg: &CollectConfig,
    gradle_modules: &HashMap<String, Id>,
) -> Result<ModuleResolution, BuildInfoError> {
    let project_id = Id(format!("{}:unspecified", project_name(module_dir)));

    if let Some(output) = run_native(cfg, module_dir, "gradle", &["dependencies"]).await {
        let configs = gradle_tree::parse_gradle_dependencies(&output, gradle_modules);
        let nodes = configs.into_iter().flat_map(|c| c.nodes).collect();
        return Ok(ModuleResolution { project_id, nodes, known_paths: no_known_paths() });
    }

    for candidate in ["build.gradle", "build.gradle.kts"] {
        let path = module_dir.join(candidate);
        let Ok(source) = std::fs::read_to_string(&path) else {
            continue;
        };
        let Some(block) = gradle_fallback::extract_dependencies_block(&source) else {
            continue;
        };
        tracing::debug!(module = %project_id, "gradle unavailable, scanning {candidate} directly");
        let nodes = gradle_fallback::parse_dependency_block(&block);
        return Ok(ModuleResolution { project_id, nodes, known_paths: no_known_paths() });
    }

    Ok(ModuleResolution { project_id, nodes: Vec::new(), known_paths: no_known_paths() })
}

fn resolve_cargo(module_dir: &Path) -> Result<ModuleResolution, BuildInfoError> {
    let manifest = buildinfo_manifest::cargo::read_manifest(&module_dir.join("Cargo.toml"))?;
    let project_id = manifest
        .package
        .as_ref()
        .map(|p| Id(format!("{}:{}", p.name, p.version)))
        .unwrap_or_else(|| Id(format!("{}:0.0.0", project_name(module_dir))));

    let lock_path = module_dir.join("Cargo.lock");
    let lock = if lock_path.is_file() {
        let contents = std::fs::read_to_string(&lock_path).map_err(BuildInfoError::Io)?;
        buildinfo_manifest::cargo::parse_cargo_lock(&contents)?
    } else {
        Vec::new()
    };

    let nodes = cargo_graph::build_cargo_tree(&manifest, &lock);
    Ok(ModuleResolution { project_id, nodes, known_paths: no_known_paths() })
}

fn resolve_bundler(module_dir: &Path) -> Result<ModuleResolution, BuildInfoError> {
    let project_id = Id(format!("{}:0.0.0", project_name(module_dir)));
    let lock = buildinfo_manifest::gemfile::read_lockfile(&module_dir.join("Gemfile.lock"))?;
    let nodes = bundler_graph::build_bundler_tree(&lock);
    Ok(ModuleResolution { project_id, nodes, known_paths: no_known_paths() })
}

fn resolve_poetry(module_dir: &Path) -> Result<ModuleResolution, BuildInfoError> {
    let project = buildinfo_manifest::poetry::read_pyproject(&module_dir.join("pyproject.toml"))?;
    let project_id = project
        .tool
        .as_ref()
        .and_then(|t| t.poetry.as_ref())
        .map(|p| {
            Id(format!(
                "{}:{}",
                p.name.clone().unwrap_or_else(|| project_name(module_dir)),
                p.version.clone().unwrap_or_else(|| "0.0.0".into())
            ))
        })
        .unwrap_or_else(|| Id(format!("{}:0.0.0", project_name(module_dir))));

    let lock_path = module_dir.join("poetry.lock");
    let lock = if lock_path.is_file() {
        let contents = std::fs::read_to_string(&lock_path).map_err(BuildInfoError::Io)?;
        buildinfo_manifest::poetry::parse_poetry_lock(&contents)?
    } else {
        Vec::new()
    };

    let nodes = buildinfo_parsers::poetry_graph::build_poetry_tree(&project, &lock);
    Ok(ModuleResolution { project_id, nodes, known_paths: no_known_paths() })
}

async fn resolve_conan(
    module_dir: &Path,
    cfg: &CollectConfig,
) -> Result<ModuleResolution, BuildInfoError> {
    let project_id = Id(format!("{}:0.0.0", project_name(module_dir)));

    let json = run_native(cfg, module_dir, "conan", &["graph", "info", ".", "--format=json"])
        .await
        .ok_or_else(|| BuildInfoError::ExecutableNotFound { name: "conan".into() })?;

    let nodes = conan_graph::parse_conan_graph(&json)?;
    let folders = conan_graph::package_folders(&json)?;

    let mut known_paths = std::collections::HashMap::new();
    for node in &nodes {
        if let Some(folder) = folders.get(&node.id.0) {
            known_paths.insert(node.id.clone(), std::path::PathBuf::from(folder));
        }
    }

    Ok(ModuleResolution { project_id, nodes, known_paths })
}

fn resolve_helm(module_dir: &Path) -> Result<ModuleResolution, BuildInfoError> {
    let chart = buildinfo_manifest::helm::read_chart(&module_dir.join("Chart.yaml"))?;
    let project_id = Id(format!("{}:{}", chart.name, chart.version));

    let lock_path = module_dir.join("Chart.lock");
    let lock = if lock_path.is_file() {
        let contents = std::fs::read_to_string(&lock_path).map_err(BuildInfoError::Io)?;
        Some(buildinfo_manifest::helm::parse_chart_lock(&contents)?)
    } else {
        None
    };

    let nodes = helm_graph::build_helm_nodes(&chart, lock.as_ref(), None);
    Ok(ModuleResolution { project_id, nodes, known_paths: no_known_paths() })
}

fn project_name(module_dir: &Path) -> String {
    module_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cargo_resolution_reads_manifest_and_lock() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("Cargo.toml"),
            "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n\n[dependencies]\nserde = \"1\"\n",
        )
        .unwrap();
        std::fs::write(
            tmp.path().join("Cargo.lock"),
            "[[package]]\nname = \"demo\"\nversion = \"0.1.0\"\ndependencies = [\"serde\"]\n\n[[package]]\nname = \"serde\"\nversion = \"1.0.200\"\n",
        )
        .unwrap();

        let resolution = resolve_cargo(tmp.path()).unwrap();
        assert_eq!(resolution.project_id, Id("demo:0.1.0".into()));
        assert_eq!(resolution.nodes.len(), 1);
        assert_eq!(resolution.nodes[0].name, "serde");
    }

    #[test]
    fn bundler_resolution_reads_lockfile() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("Gemfile.lock"),
            "GEM\n  remote: https://rubygems.org/\n  specs:\n    rake (13.0.6)\n\nDEPENDENCIES\n  rake\n",
        )
        .unwrap();

        let resolution = resolve_bundler(tmp.path()).unwrap();
        assert_eq!(resolution.nodes.len(), 1);
        assert_eq!(resolution.nodes[0].name, "rake");
    }

    #[test]
    fn gradle_module_map_uses_own_group_and_version_when_declared() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("build.gradle"), "group 'g'\nversion '1.0'\n").unwrap();
        let core_dir = tmp.path().join("lib/core");
        std::fs::create_dir_all(&core_dir).unwrap();
        std::fs::write(core_dir.join("build.gradle"), "version '2.0'\n").unwrap();

        let module_dirs = vec![
            (".".to_string(), tmp.path().to_path_buf()),
            (":lib:core".to_string(), core_dir),
        ];
        let map = build_gradle_module_map(&module_dirs);

        // Own version, inherited group.
        assert_eq!(map.get(":lib:core"), Some(&Id("g:core:2.0".into())));
        // Root identity stored for the synthesize-when-unknown fallback.
        assert_eq!(map.get(""), Some(&Id("g:root:1.0".into())));
    }

    #[test]
    fn gradle_module_map_falls_back_to_root_identity_entirely() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("build.gradle"), "group 'g'\nversion '1.0'\n").unwrap();
        let app_dir = tmp.path().join("app");
        std::fs::create_dir_all(&app_dir).unwrap();

        let module_dirs = vec![
            (".".to_string(), tmp.path().to_path_buf()),
            (":app".to_string(), app_dir),
        ];
        let map = build_gradle_module_map(&module_dirs);

        assert_eq!(map.get(":app"), Some(&Id("g:app:1.0".into())));
    }
}
