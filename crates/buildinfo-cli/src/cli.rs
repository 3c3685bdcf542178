//! CLI argument definitions for the `buildinfo` binary.

use std::path::PathBuf;

use buildinfo_model::Ecosystem;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "buildinfo",
    version,
    about = "Collect a BuildInfo document from a project's dependency manifests"
)]
pub struct Cli {
    /// Project directory to collect from (defaults to the current directory)
    #[arg(short = 'C', long = "directory")]
    pub working_directory: Option<PathBuf>,

    /// Ecosystem to collect: maven, gradle, cargo, bundler, poetry, conan, helm
    #[arg(short, long)]
    pub ecosystem: Ecosystem,

    /// Build name stamped into the emitted BuildInfo
    #[arg(long, default_value = "build")]
    pub build_name: String,

    /// Build number stamped into the emitted BuildInfo
    #[arg(long, default_value = "1")]
    pub build_number: String,

    /// Include test-scoped dependencies
    #[arg(long)]
    pub include_test_dependencies: bool,

    /// Include dev-scoped dependencies
    #[arg(long)]
    pub include_dev_dependencies: bool,

    /// Path to the native tool executable (overrides PATH lookup)
    #[arg(long)]
    pub executable_path: Option<PathBuf>,

    /// Timeout in seconds for native tool invocations
    #[arg(long, default_value_t = 120)]
    pub command_timeout_secs: u64,

    /// Extra arguments appended to native tool invocations
    #[arg(long = "extra-arg")]
    pub extra_args: Vec<String>,

    /// Publish run: gate the deployed-artifact manifest step
    #[arg(long)]
    pub publish_run: bool,

    /// Resolve submodules concurrently instead of sequentially
    #[arg(long)]
    pub parallel_modules: bool,

    /// Name of the invoking CI tool, recorded in BuildInfo::build_agent
    #[arg(long)]
    pub build_agent_name: Option<String>,

    /// Write the resulting BuildInfo JSON to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
