//! Manifest and lockfile readers: one module per ecosystem, each producing
//! the declarative set of direct dependencies a project declares before any
//! native tool has been run.

pub mod cargo;
pub mod conan;
pub mod discovery;
pub mod gemfile;
pub mod gradle;
pub mod helm;
pub mod pom;
pub mod poetry;

pub use discovery::{discover_manifest, ManifestKind};
