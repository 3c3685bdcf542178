//! `Cargo.toml` / `Cargo.lock` reading.
//!
//! Cargo is unusual among the supported ecosystems in that its lockfile
//! already contains the fully resolved dependency graph (including
//! transitive edges and exact versions) — there is no separate native
//! "print the dependency tree" step to shell out to. `buildinfo-parsers`
//! reads `Cargo.lock` directly as its tree source; this module only reads
//! the manifest for package identity and declared (unresolved) dependency
//! names.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use buildinfo_util::errors::BuildInfoError;

#[derive(Debug, Clone, Deserialize)]
pub struct CargoManifest {
    pub package: Option<CargoPackage>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, CargoDependencySpec>,
    #[serde(default, rename = "dev-dependencies")]
    pub dev_dependencies: BTreeMap<String, CargoDependencySpec>,
    #[serde(default, rename = "build-dependencies")]
    pub build_dependencies: BTreeMap<String, CargoDependencySpec>,
    pub workspace: Option<CargoWorkspace>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CargoPackage {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CargoWorkspace {
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CargoDependencySpec {
    Version(String),
    Detailed {
        version: Option<String>,
        #[serde(default)]
        optional: bool,
    },
}

pub fn parse_cargo_toml(contents: &str) -> Result<CargoManifest, BuildInfoError> {
    toml::from_str(contents).map_err(|e| BuildInfoError::ManifestMalformed {
        message: format!("failed to parse Cargo.toml: {e}"),
    })
}

/// One locked package entry from `Cargo.lock`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedCrate {
    pub name: String,
    pub version: String,
    pub checksum: Option<String>,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawLockfile {
    #[serde(default)]
    package: Vec<RawLockedPackage>,
}

#[derive(Debug, Deserialize)]
struct RawLockedPackage {
    name: String,
    version: String,
    #[serde(default)]
    checksum: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

/// Parse `Cargo.lock`'s packages into the fully resolved set, including
/// transitive edges. `dependencies` entries are `name` or `name version`
/// (disambiguating duplicate versions of the same crate in the graph); the
/// version suffix is dropped here since [`buildinfo_parsers`] resolves
/// edges against the full package list instead.
pub fn parse_cargo_lock(contents: &str) -> Result<Vec<LockedCrate>, BuildInfoError> {
    let raw: RawLockfile = toml::from_str(contents).map_err(|e| BuildInfoError::ManifestMalformed {
        message: format!("failed to parse Cargo.lock: {e}"),
    })?;

    Ok(raw
        .package
        .into_iter()
        .map(|p| LockedCrate {
            name: p.name,
            version: p.version,
            checksum: p.checksum,
            dependencies: p
                .dependencies
                .into_iter()
                .map(|d| d.split_whitespace().next().unwrap_or_default().to_string())
                .collect(),
        })
        .collect())
}

pub fn read_manifest(path: &Path) -> Result<CargoManifest, BuildInfoError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BuildInfoError::ManifestMissing {
                path: path.to_path_buf(),
            }
        } else {
            BuildInfoError::Io(e)
        }
    })?;
    parse_cargo_toml(&contents)
}
