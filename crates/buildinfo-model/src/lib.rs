//! The BuildInfo data model: dependency identity, scopes, and the assembled
//! `BuildInfo` document itself.
//!
//! This crate has no knowledge of any particular build ecosystem — it is the
//! shared vocabulary that `buildinfo-manifest`, `buildinfo-parsers`, and
//! `buildinfo-assembler` all build on.

pub mod id;
pub mod info;
pub mod store;

pub use id::{format_id, parse_id, Ecosystem, Id, Reference, Scope};
pub use info::{AgentInfo, BuildInfo, Checksum, DeployedArtifact, Dependency, Module, VcsInfo};
pub use store::DependencyStore;
