use std::path::{Path, PathBuf};

use crate::errors::BuildInfoError;

/// Walk up from `start` looking for a directory entry named `filename`.
/// Returns the directory that contains it, or `None` if the search reaches
/// the filesystem root without a match.
pub fn find_ancestor_with(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(filename);
        if candidate.exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Walk up from `start` at most `max_levels` ancestors looking for `filename`.
pub fn find_ancestor_with_bounded(
    start: &Path,
    filename: &str,
    max_levels: usize,
) -> Option<PathBuf> {
    let mut current = start;
    for _ in 0..=max_levels {
        let candidate = current.join(filename);
        if candidate.exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
    None
}

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Verify that `candidate` resolves to a path equal to, or a strict
/// descendant of, `root`. Both paths are canonicalized (symlinks resolved)
/// before comparison so a symlink cannot be used to escape the root.
///
/// Returns the canonicalized candidate path on success.
pub fn require_within_root(root: &Path, candidate: &Path) -> Result<PathBuf, BuildInfoError> {
    let root = std::fs::canonicalize(root).map_err(BuildInfoError::Io)?;
    let resolved = std::fs::canonicalize(candidate).map_err(BuildInfoError::Io)?;
    if resolved == root || resolved.starts_with(&root) {
        Ok(resolved)
    } else {
        tracing::warn!(root = %root.display(), candidate = %candidate.display(), "rejecting path outside root");
        Err(BuildInfoError::PathTraversal {
            path: candidate.to_path_buf(),
        })
    }
}

/// Like [`require_within_root`], but for a path that does not exist yet
/// (e.g. an archive-extraction destination). Canonicalizes the nearest
/// existing ancestor of `candidate` and checks that it is within `root`.
pub fn require_within_root_uncreated(
    root: &Path,
    candidate: &Path,
) -> Result<PathBuf, BuildInfoError> {
    let root = std::fs::canonicalize(root).map_err(BuildInfoError::Io)?;

    // No path component may be `..` or an absolute root/prefix; this catches
    // traversal attempts before we even touch the filesystem.
    use std::path::Component;
    for component in candidate.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                tracing::warn!(candidate = %candidate.display(), "rejecting path component outside root");
                return Err(BuildInfoError::PathTraversal {
                    path: candidate.to_path_buf(),
                });
            }
        }
    }

    let joined = root.join(candidate);
    let mut ancestor = joined.as_path();
    while !ancestor.exists() {
        match ancestor.parent() {
            Some(p) => ancestor = p,
            None => break,
        }
    }
    let resolved_ancestor = std::fs::canonicalize(ancestor).map_err(BuildInfoError::Io)?;
    if resolved_ancestor == root || resolved_ancestor.starts_with(&root) {
        Ok(joined)
    } else {
        tracing::warn!(root = %root.display(), candidate = %candidate.display(), "rejecting path outside root");
        Err(BuildInfoError::PathTraversal {
            path: candidate.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_ancestor_locates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(tmp.path().join("marker.toml"), "").unwrap();

        let found = find_ancestor_with(&nested, "marker.toml").unwrap();
        assert_eq!(found, tmp.path());
    }

    #[test]
    fn find_ancestor_returns_none_without_match() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(find_ancestor_with(tmp.path(), "nonexistent.toml").is_none());
    }

    #[test]
    fn require_within_root_accepts_descendant() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("child");
        std::fs::create_dir_all(&nested).unwrap();
        let result = require_within_root(tmp.path(), &nested);
        assert!(result.is_ok());
    }

    #[test]
    fn require_within_root_accepts_root_itself() {
        let tmp = tempfile::tempdir().unwrap();
        let result = require_within_root(tmp.path(), tmp.path());
        assert!(result.is_ok());
    }

    #[test]
    fn require_within_root_rejects_escape() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("root");
        let outside = tmp.path().join("outside");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&outside).unwrap();

        let result = require_within_root(&root, &outside);
        assert!(matches!(result, Err(BuildInfoError::PathTraversal { .. })));
    }

    #[test]
    fn require_within_root_uncreated_rejects_dotdot() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("root");
        std::fs::create_dir_all(&root).unwrap();

        let result = require_within_root_uncreated(&root, Path::new("../../etc/passwd"));
        assert!(matches!(result, Err(BuildInfoError::PathTraversal { .. })));
    }

    #[test]
    fn require_within_root_uncreated_accepts_normal_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("root");
        std::fs::create_dir_all(&root).unwrap();

        let result = require_within_root_uncreated(&root, Path::new("charts/sub/Chart.yaml"));
        assert!(result.is_ok());
    }
}
