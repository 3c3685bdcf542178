//! buildinfo CLI binary.
//!
//! Thin example wiring: parses arguments with `clap`, initializes logging
//! via `tracing`, and calls `buildinfo_assembler::collect_build_info`. The
//! library itself never installs a global subscriber — this binary is the
//! only place that does.

mod cli;

use std::path::PathBuf;

use buildinfo_assembler::{collect_build_info, CollectConfig, FileStore, NoopStore, BuildInfoStore};
use clap::Parser;
use miette::IntoDiagnostic;

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = cli::Cli::parse();

    if !CollectConfig::enabled() {
        tracing::info!("JFROG_RUN_NATIVE disabled; skipping collection");
        return Ok(());
    }

    let cfg = CollectConfig {
        working_directory: args.working_directory.unwrap_or_else(|| PathBuf::from(".")),
        ecosystem: args.ecosystem,
        include_test_dependencies: args.include_test_dependencies,
        include_dev_dependencies: args.include_dev_dependencies,
        executable_path: args.executable_path,
        command_timeout_secs: args.command_timeout_secs,
        extra_args: args.extra_args,
        build_name: args.build_name,
        build_number: args.build_number,
        publish_run: args.publish_run,
        parallel_modules: args.parallel_modules,
        build_agent_name: args.build_agent_name,
        build_agent_version: None,
    };

    let cancel = tokio_util::sync::CancellationToken::new();
    let info = collect_build_info(&cfg.build_name.clone(), &cfg.build_number.clone(), &cfg, cancel)
        .await
        .into_diagnostic()?;

    match args.output {
        Some(path) => {
            let store = FileStore::new(path);
            store.save(&info).await.into_diagnostic()?;
        }
        None => {
            NoopStore.save(&info).await.into_diagnostic()?;
            println!("{}", serde_json::to_string_pretty(&info).into_diagnostic()?);
        }
    }

    Ok(())
}
