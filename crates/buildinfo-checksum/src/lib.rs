//! Artifact location and checksum computation.
//!
//! Every ecosystem keeps its resolved artifacts in a local cache with its
//! own layout; this crate's job is to go from a `group:name:version` (or
//! ecosystem-equivalent) reference to a file on disk — falling back
//! through a cascade when the cache doesn't have it — and then to compute
//! that file's checksums in one streaming pass.

pub mod cascade;
pub mod helm_archive;
pub mod roots;

pub use cascade::{locate_artifact, ArtifactLocation};
