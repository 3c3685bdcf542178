use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::id::{Id, Scope};

/// The three digests carried for every artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    pub sha1: String,
    pub sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
}

/// A single resolved dependency, as it will appear inside a [`Module`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    pub id: Id,
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub scopes: BTreeSet<Scope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<Checksum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Every chain of ancestor ids, root-first, by which this dependency was
    /// reached. Computed once at assembly time by inverting the adjacency
    /// map — never maintained incrementally during BFS, since a node can
    /// gain new parents right up until resolution finishes.
    #[serde(rename = "requestedBy", default, skip_serializing_if = "Vec::is_empty")]
    pub requested_by: Vec<Vec<Id>>,
}

impl Dependency {
    pub fn new(id: Id, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            version: version.into(),
            type_: "jar".to_string(),
            scopes: BTreeSet::new(),
            checksum: None,
            path: None,
            requested_by: Vec::new(),
        }
    }
}

/// A deployed build artifact (the thing a publish step would upload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployedArtifact {
    pub name: String,
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<Checksum>,
}

/// One resolved unit of the build — a Maven module, a Gradle subproject, a
/// Cargo workspace member, a Helm (sub)chart, and so on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: Id,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<DeployedArtifact>,
}

impl Module {
    pub fn new(id: Id, type_: impl Into<String>) -> Self {
        Self {
            id,
            type_: type_.into(),
            repository: None,
            dependencies: Vec::new(),
            artifacts: Vec::new(),
        }
    }
}

/// Identifies the program that produced (or orchestrated) the build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    pub version: String,
}

/// Version-control context captured for the working directory at collection
/// time. Only `.git` is probed today — see `buildinfo-vcs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub revision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The assembled build-info document: everything the collector gathered
/// about one build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildInfo {
    pub name: String,
    pub number: String,
    pub started: String,
    pub agent: AgentInfo,
    #[serde(rename = "buildAgent")]
    pub build_agent: AgentInfo,
    pub modules: Vec<Module>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs: Option<VcsInfo>,
}
