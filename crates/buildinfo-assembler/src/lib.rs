//! Multi-module BuildInfo assembly.
//!
//! `collect_build_info` is the sole public entry point: given a
//! [`CollectConfig`], it discovers the project's submodules, resolves each
//! one's dependency graph (native tool output, degrading to a declarative
//! manifest scan), runs the Artifact Locator cascade over every resolved
//! dependency, and probes VCS context — producing one [`BuildInfo`]
//! document. Persisting that document is the caller's job via
//! [`BuildInfoStore`].

mod assembler;
pub mod config;
mod resolve;
mod store;
mod submodules;

pub use assembler::collect_build_info;
pub use config::{CollectConfig, GlobalDefaults};
pub use store::{BuildInfoStore, FileStore, NoopStore};
pub use submodules::{discover_submodules, SubmodulePath};

pub use buildinfo_model::BuildInfo;
