//! Per-ecosystem cache root resolution.
//!
//! Each ecosystem's native tool keeps resolved artifacts under a
//! predictable root, overridable by an environment variable, falling back
//! to a well-known default under the user's home directory.

use std::path::PathBuf;

use buildinfo_model::Ecosystem;

/// Resolve the cache root a given ecosystem's native tool reads from.
/// Returns `None` when neither the override env var nor `$HOME` (or
/// platform equivalent) is set — the caller should then fall back to a
/// project-local cache directory if one exists.
pub fn cache_root(ecosystem: Ecosystem) -> Option<PathBuf> {
    match ecosystem {
        Ecosystem::Maven => home_dir().map(|h| h.join(".m2").join("repository")),
        Ecosystem::Gradle => std::env::var_os("GRADLE_USER_HOME")
            .map(PathBuf::from)
            .or_else(|| home_dir().map(|h| h.join(".gradle")))
            .map(|root| root.join("caches").join("modules-2").join("files-2.1")),
        Ecosystem::Cargo => std::env::var_os("CARGO_HOME")
            .map(PathBuf::from)
            .or_else(|| home_dir().map(|h| h.join(".cargo")))
            .map(|root| root.join("registry")),
        Ecosystem::Bundler => std::env::var_os("BUNDLE_PATH")
            .map(PathBuf::from)
            .or_else(|| home_dir().map(|h| h.join(".gem")))
            .map(|root| root.join("ruby")),
        Ecosystem::Poetry => std::env::var_os("POETRY_CACHE_DIR")
            .map(PathBuf::from)
            .or_else(cache_home)
            .map(|root| root.join("pypoetry").join("cache")),
        Ecosystem::Conan => std::env::var_os("CONAN_USER_HOME")
            .map(PathBuf::from)
            .or_else(|| home_dir().map(|h| h.join(".conan2")))
            .map(|root| root.join("p")),
        Ecosystem::Helm => std::env::var_os("HELM_REPOSITORY_CACHE")
            .map(PathBuf::from)
            .or_else(cache_home)
            .map(|root| root.join("helm").join("repository")),
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

fn cache_home() -> Option<PathBuf> {
    std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| home_dir().map(|h| h.join(".cache")))
}
