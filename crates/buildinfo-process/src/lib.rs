//! Timeboxed, cancellable invocation of native build tools.
//!
//! Every ecosystem adapter that shells out to `gradle`, `mvn`, `cargo`,
//! `bundle`, `poetry`, `conan`, or `helm` goes through [`run_tool`] rather
//! than touching `tokio::process` directly, so timeout handling, output
//! capping, and cooperative cancellation are implemented exactly once.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

pub use tokio_util::sync::CancellationToken as Cancellation;

/// How an invocation should be bounded.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Working directory the child process is spawned in.
    pub working_dir: PathBuf,
    /// Environment variables to set (merged over the parent's own env).
    pub env: Vec<(String, String)>,
    /// Hard wall-clock deadline. `None` means "no timeout", still subject to
    /// `cancellation`.
    pub timeout: Option<Duration>,
    /// Maximum bytes retained per stream; output beyond this is discarded
    /// and `truncated` is set, but the child keeps running to completion
    /// (or its own exit) rather than backpressuring on a full pipe.
    pub max_bytes: usize,
    /// An externally-held token; the caller can cancel a batch of
    /// invocations by firing this, independent of the per-call timeout.
    pub cancellation: Option<CancellationToken>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            env: Vec::new(),
            timeout: None,
            max_bytes: 16 * 1024 * 1024,
            cancellation: None,
        }
    }
}

/// Captured output from one stream, with truncation bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

impl CapturedOutput {
    pub fn as_str_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// The outcome of a single tool invocation.
#[derive(Debug)]
pub struct RunResult {
    pub exit_code: Option<i32>,
    pub stdout: CapturedOutput,
    pub stderr: CapturedOutput,
    pub timed_out: bool,
    pub cancelled: bool,
}

impl RunResult {
    pub fn success(&self) -> bool {
        !self.timed_out && !self.cancelled && self.exit_code == Some(0)
    }
}

/// Run `executable args...` under `opts`, capturing stdout/stderr up to
/// `opts.max_bytes` each, and killing the child (best-effort, the whole
/// process group where the platform allows it) if either the timeout
/// elapses or `opts.cancellation` fires first.
pub async fn run_tool(
    executable: &Path,
    args: &[String],
    opts: RunOptions,
) -> std::io::Result<RunResult> {
    let mut command = Command::new(executable);
    command
        .args(args)
        .current_dir(&opts.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for (k, v) in &opts.env {
        command.env(k, v);
    }

    tracing::debug!(executable = %executable.display(), ?args, "spawning tool");
    let mut child = command.spawn()?;
    let mut stdout_pipe = child.stdout.take().expect("stdout was piped");
    let mut stderr_pipe = child.stderr.take().expect("stderr was piped");

    let max_bytes = opts.max_bytes;
    let stdout_task = tokio::spawn(async move { capture(&mut stdout_pipe, max_bytes).await });
    let stderr_task = tokio::spawn(async move { capture(&mut stderr_pipe, max_bytes).await });

    let cancel_token = opts.cancellation.clone().unwrap_or_default();
    let wait_fut = child.wait();

    let (timed_out, cancelled, status) = match opts.timeout {
        Some(duration) => {
            tokio::select! {
                status = wait_fut => {
                    (false, false, Some(status))
                }
                _ = tokio::time::sleep(duration) => {
                    tracing::warn!(executable = %executable.display(), ?duration, "tool timed out, killing child");
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    (true, false, None)
                }
                _ = cancel_token.cancelled() => {
                    tracing::debug!(executable = %executable.display(), "tool invocation cancelled");
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    (false, true, None)
                }
            }
        }
        None => {
            tokio::select! {
                status = wait_fut => {
                    (false, false, Some(status))
                }
                _ = cancel_token.cancelled() => {
                    tracing::debug!(executable = %executable.display(), "tool invocation cancelled");
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    (false, true, None)
                }
            }
        }
    };

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    let exit_code = status
        .and_then(|r| r.ok())
        .and_then(|s| s.code());

    Ok(RunResult {
        exit_code,
        stdout,
        stderr,
        timed_out,
        cancelled,
    })
}

async fn capture<R: AsyncRead + Unpin>(reader: &mut R, max_bytes: usize) -> CapturedOutput {
    let mut buf = vec![0u8; 64 * 1024];
    let mut out = Vec::new();
    let mut truncated = false;

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if out.len() < max_bytes {
                    let remaining = max_bytes - out.len();
                    let take = remaining.min(n);
                    out.extend_from_slice(&buf[..take]);
                    if take < n {
                        truncated = true;
                    }
                } else {
                    truncated = true;
                }
            }
            Err(_) => break,
        }
    }

    CapturedOutput {
        bytes: out,
        truncated,
    }
}

/// Locate an executable: an explicit override always wins, then `PATH`.
/// Ecosystem adapters layer wrapper-script discovery (`./gradlew`,
/// `./mvnw`) on top of this before falling back to it.
pub fn resolve_executable(override_path: Option<&Path>, name: &str) -> Option<PathBuf> {
    if let Some(p) = override_path {
        if p.exists() {
            return Some(p.to_path_buf());
        }
    }
    which(name)
}

fn which(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let with_exe = dir.join(format!("{name}.exe"));
            if with_exe.is_file() {
                return Some(with_exe);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_tool_captures_stdout() {
        let opts = RunOptions {
            working_dir: std::env::temp_dir(),
            ..RunOptions::default()
        };
        let result = run_tool(Path::new("/bin/echo"), &["hello".into()], opts)
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.stdout.as_str_lossy().trim(), "hello");
    }

    #[tokio::test]
    async fn run_tool_times_out() {
        let opts = RunOptions {
            working_dir: std::env::temp_dir(),
            timeout: Some(Duration::from_millis(50)),
            ..RunOptions::default()
        };
        let result = run_tool(Path::new("/bin/sleep"), &["5".into()], opts)
            .await
            .unwrap();

        assert!(result.timed_out);
        assert!(!result.success());
    }

    #[tokio::test]
    async fn run_tool_honors_cancellation() {
        let token = CancellationToken::new();
        let inner = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            inner.cancel();
        });

        let opts = RunOptions {
            working_dir: std::env::temp_dir(),
            cancellation: Some(token),
            ..RunOptions::default()
        };
        let result = run_tool(Path::new("/bin/sleep"), &["5".into()], opts)
            .await
            .unwrap();

        assert!(result.cancelled);
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn run_tool_truncates_large_output() {
        let opts = RunOptions {
            working_dir: std::env::temp_dir(),
            max_bytes: 16,
            ..RunOptions::default()
        };
        let result = run_tool(
            Path::new("/bin/sh"),
            &["-c".into(), "yes x | head -c 1000".into()],
            opts,
        )
        .await
        .unwrap();

        assert!(result.stdout.truncated);
        assert_eq!(result.stdout.bytes.len(), 16);
    }

    #[test]
    fn resolve_executable_prefers_override() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let resolved = resolve_executable(Some(tmp.path()), "nonexistent-tool-xyz");
        assert_eq!(resolved.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn resolve_executable_falls_back_to_path() {
        let resolved = resolve_executable(None, "echo");
        assert!(resolved.is_some());
    }
}
