//! Tree and graph parsers: turn native-tool dependency output (or, failing
//! that, a declarative manifest scan) into a flat list of [`ParsedNode`]s
//! that `buildinfo-assembler` feeds into a `DependencyStore`.

pub mod bundler_graph;
pub mod cargo_graph;
pub mod conan_graph;
pub mod gradle_fallback;
pub mod gradle_tree;
pub mod helm_graph;
pub mod maven_tree;
pub mod poetry_graph;

use buildinfo_model::{Id, Scope};

/// One dependency node recovered from either native tool output or a
/// fallback declarative scan, still referencing its parent by id rather
/// than by index — `buildinfo-assembler` is the only place that builds the
/// actual [`buildinfo_model::DependencyStore`] adjacency out of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNode {
    pub id: Id,
    pub name: String,
    pub version: String,
    pub scope: Scope,
    /// `None` for the root of the tree.
    pub parent_id: Option<Id>,
    /// Stop descending into this node's own children — set when the native
    /// tool already printed this subtree elsewhere (Gradle's `(*)`) or
    /// denotes a version-constraint-only entry (Gradle's `(c)`).
    pub omitted_for_duplicate: bool,
    /// Lockfile-embedded checksum (Cargo.lock's `checksum` field), when the
    /// source carries one. Feeds the Artifact Locator's lockfile-checksum
    /// step directly, ahead of the cache-path lookup.
    pub checksum: Option<String>,
}
