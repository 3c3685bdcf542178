//! Version-control probing.
//!
//! Only Git is implemented. Mercurial and Subversion working copies are
//! recognized by the absence of a `.git` directory but are not inspected —
//! see `DESIGN.md` for why this is scoped down rather than stubbed out with
//! a half-working implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use buildinfo_model::VcsInfo;
use buildinfo_process::{resolve_executable, run_tool, RunOptions};
use buildinfo_util::fs::find_ancestor_with_bounded;

const GIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Ancestor search depth for a `.git` directory — deep enough for any
/// reasonable module nesting without walking all the way to the filesystem
/// root on an unrelated working directory.
const GIT_ANCESTOR_SEARCH_LEVELS: usize = 5;

/// Probe `start` and its ancestors (up to `GIT_ANCESTOR_SEARCH_LEVELS` up)
/// for a `.git` directory and, if found, gather the current revision,
/// branch, remote URL, and last commit message via plumbing commands.
/// Returns `Ok(None)` (not an error) when no `.git` directory is found or
/// `git` itself is unavailable — VCS context is best-effort, never fatal to
/// collection.
pub async fn probe_git(start: &Path) -> std::io::Result<Option<VcsInfo>> {
    let Some(repo_root) = find_ancestor_with_bounded(start, ".git", GIT_ANCESTOR_SEARCH_LEVELS)
    else {
        tracing::debug!(start = %start.display(), "no .git ancestor found, skipping vcs probe");
        return Ok(None);
    };

    let Some(git) = resolve_executable(None, "git") else {
        tracing::debug!("git executable not found on PATH, skipping vcs probe");
        return Ok(None);
    };

    let revision = match run_git(&git, &repo_root, &["rev-parse", "HEAD"]).await? {
        Some(s) => s,
        None => return Ok(None),
    };

    let branch = run_git(&git, &repo_root, &["rev-parse", "--abbrev-ref", "HEAD"])
        .await?
        .filter(|b| b != "HEAD");

    let url = run_git(&git, &repo_root, &["config", "--get", "remote.origin.url"]).await?;

    let message = run_git(&git, &repo_root, &["log", "-1", "--pretty=%B"]).await?;

    Ok(Some(VcsInfo {
        url,
        branch,
        revision,
        message,
    }))
}

async fn run_git(git: &PathBuf, cwd: &Path, args: &[&str]) -> std::io::Result<Option<String>> {
    let opts = RunOptions {
        working_dir: cwd.to_path_buf(),
        timeout: Some(GIT_TIMEOUT),
        ..RunOptions::default()
    };
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let result = run_tool(git, &args, opts).await?;

    if !result.success() {
        return Ok(None);
    }
    let out = result.stdout.as_str_lossy().trim().to_string();
    if out.is_empty() {
        Ok(None)
    } else {
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn init_repo(dir: &Path) {
        let git = resolve_executable(None, "git").expect("git must be on PATH for this test");
        for args in [
            vec!["init", "-q"],
            vec!["config", "user.email", "test@example.com"],
            vec!["config", "user.name", "Test"],
        ] {
            let opts = RunOptions {
                working_dir: dir.to_path_buf(),
                ..RunOptions::default()
            };
            let args: Vec<String> = args.into_iter().map(String::from).collect();
            run_tool(&git, &args, opts).await.unwrap();
        }
        std::fs::write(dir.join("README.md"), "hello").unwrap();
        let git2 = git.clone();
        let opts = RunOptions {
            working_dir: dir.to_path_buf(),
            ..RunOptions::default()
        };
        run_tool(&git2, &["add".into(), ".".into()], opts)
            .await
            .unwrap();
        let opts = RunOptions {
            working_dir: dir.to_path_buf(),
            ..RunOptions::default()
        };
        run_tool(
            &git,
            &["commit".into(), "-q".into(), "-m".into(), "initial".into()],
            opts,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn probe_git_returns_none_without_repo() {
        let tmp = tempfile::tempdir().unwrap();
        let result = probe_git(tmp.path()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn probe_git_does_not_find_repo_beyond_search_depth() {
        let tmp = tempfile::tempdir().unwrap();
        init_repo(tmp.path()).await;

        let mut nested = tmp.path().to_path_buf();
        for _ in 0..(GIT_ANCESTOR_SEARCH_LEVELS + 2) {
            nested.push("deep");
        }
        std::fs::create_dir_all(&nested).unwrap();

        let result = probe_git(&nested).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn probe_git_reads_revision_and_message() {
        let tmp = tempfile::tempdir().unwrap();
        init_repo(tmp.path()).await;

        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let info = probe_git(&nested).await.unwrap().expect("expected vcs info");
        assert_eq!(info.revision.len(), 40);
        assert_eq!(info.message.as_deref(), Some("initial"));
    }
}
