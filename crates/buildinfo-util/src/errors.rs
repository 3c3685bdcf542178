use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for every BuildInfo operation.
///
/// `collect_build_info` only ever returns `ConfigInvalid`, `Cancelled`, or an
/// unrecoverable `Io` error on the working directory itself — every other
/// variant is recovered locally by the adapter's fallback cascade and
/// surfaced only as a logged `tracing` event.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildInfoError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller-supplied configuration is invalid (e.g. a missing working directory).
    #[error("invalid configuration: {message}")]
    #[diagnostic(help("check workingDirectory and the other CollectConfig fields"))]
    ConfigInvalid { message: String },

    /// A manifest file that should exist could not be found.
    #[error("manifest missing: {path}")]
    ManifestMissing { path: PathBuf },

    /// A manifest file exists but could not be parsed.
    #[error("manifest malformed: {message}")]
    #[diagnostic(help("check the file for syntax errors"))]
    ManifestMalformed { message: String },

    /// The configured or auto-discovered tool executable could not be found.
    #[error("executable not found: {name}")]
    #[diagnostic(help("install the tool or set executablePath explicitly"))]
    ExecutableNotFound { name: String },

    /// A tool invocation exceeded its deadline.
    #[error("tool timed out after {seconds}s: {command}")]
    ToolTimeout { command: String, seconds: u64 },

    /// A tool invocation exited with a non-zero status.
    #[error("tool exited {code}: {command}")]
    ToolNonZeroExit { command: String, code: i32 },

    /// A parser could not make sense of tool output or a declarative file.
    #[error("parse error: {message}")]
    ParseError { message: String },

    /// A resolved path escaped its configured root.
    #[error("path traversal rejected: {path}")]
    PathTraversal { path: PathBuf },

    /// Reading a file to compute its checksum failed.
    #[error("checksum I/O error for {path}: {message}")]
    ChecksumIoError { path: PathBuf, message: String },

    /// The caller's cancellation token fired mid-collection.
    #[error("collection cancelled")]
    Cancelled,
}

/// Convenience alias for `miette::Result<T>`.
pub type BuildInfoResult<T> = miette::Result<T>;
