//! Collection configuration, loaded the way a build tool's global config
//! usually is: read if present, otherwise fall back to defaults.
//! `CollectConfig` carries the per-invocation settings;
//! `GlobalDefaults` carries the rarely-changed user-wide ones a caller can
//! layer underneath it.

use std::path::PathBuf;
use std::time::Duration;

use buildinfo_model::Ecosystem;
use serde::{Deserialize, Serialize};

fn default_timeout_secs() -> u64 {
    120
}

/// Settings for a single `collect_build_info` invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectConfig {
    pub working_directory: PathBuf,
    pub ecosystem: Ecosystem,

    #[serde(default)]
    pub include_test_dependencies: bool,
    #[serde(default)]
    pub include_dev_dependencies: bool,

    #[serde(default)]
    pub executable_path: Option<PathBuf>,

    #[serde(default = "default_timeout_secs", rename = "command_timeout_secs")]
    pub command_timeout_secs: u64,

    #[serde(default)]
    pub extra_args: Vec<String>,

    pub build_name: String,
    pub build_number: String,

    /// Gates the deployed-artifact manifest step (`build/ci-artifacts-manifest.json`).
    #[serde(default)]
    pub publish_run: bool,

    /// Off by default: when set, each module gets its own `tokio::task` and
    /// its own `DependencyStore`, with no shared mutable state across tasks.
    #[serde(default)]
    pub parallel_modules: bool,

    /// Identifies the invoking CI tool in the emitted `BuildInfo::build_agent`.
    #[serde(default)]
    pub build_agent_name: Option<String>,
    #[serde(default)]
    pub build_agent_version: Option<String>,
}

impl CollectConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Whether the native-tool invocation path is enabled at all, per the
    /// `JFROG_RUN_NATIVE` environment variable. This is a caller-facing
    /// guard, not something `collect_build_info` checks itself — the
    /// library function stays a pure callable regardless of environment.
    pub fn enabled() -> bool {
        std::env::var("JFROG_RUN_NATIVE")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true)
    }
}

/// Rarely-changed, user-wide defaults loaded from `~/.buildinfo/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalDefaults {
    #[serde(default)]
    pub default_command_timeout_secs: Option<u64>,
    #[serde(default)]
    pub default_build_agent_name: Option<String>,
}

impl GlobalDefaults {
    /// Read `~/.buildinfo/config.toml` if present, else return defaults.
    pub fn load() -> Self {
        let Some(home) = std::env::var_os("HOME") else {
            return Self::default();
        };
        let path = PathBuf::from(home).join(".buildinfo").join("config.toml");
        match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_timeout_defaults_to_120_seconds() {
        let toml_src = r#"
            working_directory = "."
            ecosystem = "cargo"
            build_name = "demo"
            build_number = "1"
        "#;
        let cfg: CollectConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(cfg.command_timeout(), Duration::from_secs(120));
        assert!(!cfg.publish_run);
        assert!(!cfg.parallel_modules);
    }

    #[test]
    fn global_defaults_falls_back_when_missing() {
        std::env::remove_var("HOME");
        let defaults = GlobalDefaults::load();
        assert!(defaults.default_command_timeout_secs.is_none());
    }
}
