//! The `collect_build_info` entry point: ties manifest discovery, native
//! tool invocation/fallback parsing, the Artifact Locator cascade, and VCS
//! probing together into one `BuildInfo` document.

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

use buildinfo_model::{BuildInfo, Dependency, Module};
use buildinfo_util::errors::BuildInfoError;

use crate::config::CollectConfig;
use crate::resolve::{self, ModuleResolution};
use crate::submodules::discover_submodules;

/// The sole public library entry point. No file I/O beyond reading the
/// project's own manifests/lockfiles happens here — serialization and
/// persistence are the caller's `BuildInfoStore`'s job.
pub async fn collect_build_info(
    name: &str,
    number: &str,
    cfg: &CollectConfig,
    cancel: CancellationToken,
) -> Result<BuildInfo, BuildInfoError> {
    if !cfg.working_directory.is_dir() {
        return Err(BuildInfoError::ConfigInvalid {
            message: format!(
                "workingDirectory does not exist or is not a directory: {}",
                cfg.working_directory.display()
            ),
        });
    }

    let started = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| BuildInfoError::ConfigInvalid {
            message: format!("failed to format current time: {e}"),
        })?;

    let agent = buildinfo_model::AgentInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let build_agent = buildinfo_model::AgentInfo {
        name: cfg.build_agent_name.clone().unwrap_or_else(|| agent.name.clone()),
        version: cfg.build_agent_version.clone().unwrap_or_else(|| agent.version.clone()),
    };

    let vcs = buildinfo_vcs::probe_git(&cfg.working_directory)
        .await
        .unwrap_or(None);

    let mut module_dirs = vec![(".".to_string(), cfg.working_directory.clone())];
    for submodule in discover_submodules(&cfg.working_directory, cfg.ecosystem) {
        module_dirs.push((submodule.name, submodule.dir));
    }

    let gradle_modules = if cfg.ecosystem == buildinfo_model::Ecosystem::Gradle {
        resolve::build_gradle_module_map(&module_dirs)
    } else {
        std::collections::HashMap::new()
    };

    let modules = if cfg.parallel_modules {
        collect_modules_parallel(module_dirs, cfg, &gradle_modules, &cancel).await?
    } else {
        collect_modules_sequential(module_dirs, cfg, &gradle_modules, &cancel).await?
    };

    Ok(BuildInfo {
        name: name.to_string(),
        number: number.to_string(),
        started,
        agent,
        build_agent,
        modules,
        vcs,
    })
}

async fn collect_modules_sequential(
    module_dirs: Vec<(String, std::path::PathBuf)>,
    cfg: &CollectConfig,
    gradle_modules: &std::collections::HashMap<String, buildinfo_model::Id>,
    cancel: &CancellationToken,
) -> Result<Vec<Module>, BuildInfoError> {
    let mut modules = Vec::with_capacity(module_dirs.len());
    for (label, dir) in module_dirs {
        if cancel.is_cancelled() {
            return Err(BuildInfoError::Cancelled);
        }
        match resolve_and_build(&label, &dir, cfg, gradle_modules).await {
            Ok(module) => modules.push(module),
            Err(err) => {
                tracing::warn!(module = %label, error = %err, "skipping module after resolution failure");
            }
        }
    }
    Ok(modules)
}

/// Each task gets its own `DependencyStore` via `resolve_and_build` — no
/// mutable state is shared across tasks, per the single-writer-per-module
/// concurrency rule.
async fn collect_modules_parallel(
    module_dirs: Vec<(String, std::path::PathBuf)>,
    cfg: &CollectConfig,
    gradle_modules: &std::collections::HashMap<String, buildinfo_model::Id>,
    cancel: &CancellationToken,
) -> Result<Vec<Module>, BuildInfoError> {
    if cancel.is_cancelled() {
        return Err(BuildInfoError::Cancelled);
    }

    let mut handles = Vec::with_capacity(module_dirs.len());
    for (label, dir) in module_dirs {
        let cfg = cfg.clone();
        let gradle_modules = gradle_modules.clone();
        handles.push(tokio::spawn(async move {
            let result = resolve_and_build(&label, &dir, &cfg, &gradle_modules).await;
            (label, result)
        }));
    }

    let mut modules = Vec::with_capacity(handles.len());
    for handle in handles {
        if cancel.is_cancelled() {
            return Err(BuildInfoError::Cancelled);
        }
        let (label, result) = handle.await.map_err(|e| BuildInfoError::ConfigInvalid {
            message: format!("module task panicked: {e}"),
        })?;
        match result {
            Ok(module) => modules.push(module),
            Err(err) => {
                tracing::warn!(module = %label, error = %err, "skipping module after resolution failure");
            }
        }
    }
    Ok(modules)
}

async fn resolve_and_build(
    label: &str,
    dir: &std::path::Path,
    cfg: &CollectConfig,
    gradle_modules: &std::collections::HashMap<String, buildinfo_model::Id>,
) -> Result<Module, BuildInfoError> {
    let _span = tracing::info_span!("module", name = %label).entered();
    let resolution = resolve::resolve(dir, cfg, gradle_modules).await?;
    Ok(build_module(resolution, cfg))
}

/// Fold a flat `ParsedNode` list into a `DependencyStore`, compute
/// `requestedBy` once over the finished graph, then run the Artifact
/// Locator cascade per node before producing the `Module`.
fn build_module(resolution: ModuleResolution, cfg: &CollectConfig) -> Module {
    let ModuleResolution { project_id, nodes, known_paths } = resolution;

    let mut store = buildinfo_model::DependencyStore::new();
    store.set_root(project_id.clone());
    store.insert_or_merge(Dependency::new(
        project_id.clone(),
        project_id.0.clone(),
        String::new(),
    ));

    // Lockfile-embedded checksums (currently only Cargo.lock carries one)
    // feed the Artifact Locator cascade as a fallback once the cache-path
    // lookup below misses.
    let mut lockfile_checksums: std::collections::HashMap<buildinfo_model::Id, String> =
        std::collections::HashMap::new();
    for node in &nodes {
        if let Some(checksum) = &node.checksum {
            lockfile_checksums
                .entry(node.id.clone())
                .or_insert_with(|| checksum.clone());
        }
    }

    for node in &nodes {
        if !cfg.include_test_dependencies && node.scope == buildinfo_model::Scope::Test {
            continue;
        }
        if !cfg.include_dev_dependencies && node.scope == buildinfo_model::Scope::Dev {
            continue;
        }

        let mut dep = Dependency::new(node.id.clone(), node.name.clone(), node.version.clone());
        dep.scopes.insert(node.scope);
        store.insert_or_merge(dep);

        let parent = node.parent_id.clone().unwrap_or_else(|| project_id.clone());
        store.add_edge(&parent, &node.id);
    }

    store.finalize_requested_by();

    let mut dependencies = store.into_dependencies();
    for dep in dependencies.iter_mut() {
        if dep.id == project_id {
            continue;
        }
        let known = known_paths.get(&dep.id).map(|p| p.as_path());
        if let Some(location) = buildinfo_checksum::locate_artifact(cfg.ecosystem, &dep.id, known) {
            dep.path = Some(location.path);
            dep.checksum = Some(buildinfo_model::Checksum {
                sha1: location.digest.sha1,
                sha256: location.digest.sha256,
                md5: Some(location.digest.md5),
            });
        } else if let Some(sha256) = lockfile_checksums.get(&dep.id) {
            dep.checksum = Some(buildinfo_model::Checksum {
                sha1: String::new(),
                sha256: sha256.clone(),
                md5: None,
            });
        }
    }
    dependencies.retain(|dep| dep.id != project_id);

    let mut module = Module::new(project_id, cfg.ecosystem.to_string());
    module.dependencies = dependencies;
    module
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildinfo_model::{Ecosystem, Id, Scope};
    use buildinfo_parsers::ParsedNode;
    use std::collections::HashMap;

    fn cfg() -> CollectConfig {
        CollectConfig {
            working_directory: std::path::PathBuf::from("."),
            ecosystem: Ecosystem::Cargo,
            include_test_dependencies: false,
            include_dev_dependencies: true,
            executable_path: None,
            command_timeout_secs: 30,
            extra_args: Vec::new(),
            build_name: "demo".into(),
            build_number: "1".into(),
            publish_run: false,
            parallel_modules: false,
            build_agent_name: None,
            build_agent_version: None,
        }
    }

    #[test]
    fn build_module_excludes_test_scope_by_default() {
        let project_id = Id("demo:0.1.0".into());
        let nodes = vec![
            ParsedNode {
                id: Id("serde:1.0.200".into()),
                name: "serde".into(),
                version: "1.0.200".into(),
                scope: Scope::Compile,
                parent_id: None,
                omitted_for_duplicate: false,
                checksum: None,
            },
            ParsedNode {
                id: Id("proptest:1.0.0".into()),
                name: "proptest".into(),
                version: "1.0.0".into(),
                scope: Scope::Test,
                parent_id: None,
                omitted_for_duplicate: false,
                checksum: None,
            },
        ];
        let resolution = ModuleResolution {
            project_id: project_id.clone(),
            nodes,
            known_paths: HashMap::new(),
        };

        let module = build_module(resolution, &cfg());
        assert_eq!(module.dependencies.len(), 1);
        assert_eq!(module.dependencies[0].name, "serde");
    }

    #[test]
    fn build_module_falls_back_to_lockfile_checksum_when_cache_lookup_misses() {
        let project_id = Id("demo:0.1.0".into());
        let nodes = vec![ParsedNode {
            id: Id("serde:1.0.0".into()),
            name: "serde".into(),
            version: "1.0.0".into(),
            scope: Scope::Compile,
            parent_id: None,
            omitted_for_duplicate: false,
            checksum: Some("aabbccdd".into()),
        }];
        let resolution = ModuleResolution {
            project_id: project_id.clone(),
            nodes,
            known_paths: HashMap::new(),
        };

        let module = build_module(resolution, &cfg());
        let serde = module.dependencies.iter().find(|d| d.name == "serde").unwrap();
        let checksum = serde.checksum.as_ref().unwrap();
        assert_eq!(checksum.sha256, "aabbccdd");
        assert!(serde.scopes.contains(&Scope::Compile));
    }

    #[test]
    fn build_module_root_never_appears_in_its_own_dependency_list() {
        let project_id = Id("demo:0.1.0".into());
        let resolution = ModuleResolution {
            project_id: project_id.clone(),
            nodes: Vec::new(),
            known_paths: HashMap::new(),
        };
        let module = build_module(resolution, &cfg());
        assert!(module.dependencies.iter().all(|d| d.id != project_id));
    }
}
