//! The `BuildInfoStore` collaborator: this crate has no opinion on where a
//! finished `BuildInfo` document ends up. Production backends (an artifact
//! repository, an object store, a CI system's own API) live outside this
//! crate; `NoopStore` and `FileStore` exist only for tests and examples.

use std::path::PathBuf;

use buildinfo_model::BuildInfo;
use buildinfo_util::errors::BuildInfoError;

pub trait BuildInfoStore: Send + Sync {
    fn save(
        &self,
        info: &BuildInfo,
    ) -> impl std::future::Future<Output = Result<(), BuildInfoError>> + Send;
}

/// Discards the document. Useful when a caller only wants the in-memory
/// `BuildInfo` value and handles persistence itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStore;

impl BuildInfoStore for NoopStore {
    async fn save(&self, _info: &BuildInfo) -> Result<(), BuildInfoError> {
        Ok(())
    }
}

/// Writes the document as pretty-printed JSON to a fixed path.
#[derive(Debug, Clone)]
pub struct FileStore {
    pub path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BuildInfoStore for FileStore {
    async fn save(&self, info: &BuildInfo) -> Result<(), BuildInfoError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BuildInfoError::Io)?;
        }
        let json = serde_json::to_vec_pretty(info).map_err(|e| BuildInfoError::ParseError {
            message: format!("failed to serialize BuildInfo: {e}"),
        })?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(BuildInfoError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildinfo_model::{AgentInfo, Id, Module};

    fn sample() -> BuildInfo {
        BuildInfo {
            name: "demo".into(),
            number: "1".into(),
            started: "2026-07-27T00:00:00Z".into(),
            agent: AgentInfo {
                name: "buildinfo-cli".into(),
                version: "0.2.0".into(),
            },
            build_agent: AgentInfo {
                name: "ci".into(),
                version: "1".into(),
            },
            modules: vec![Module::new(Id("demo:app:1.0.0".into()), "cargo")],
            vcs: None,
        }
    }

    #[tokio::test]
    async fn noop_store_always_succeeds() {
        let store = NoopStore;
        assert!(store.save(&sample()).await.is_ok());
    }

    #[tokio::test]
    async fn file_store_writes_valid_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("build-info.json");
        let store = FileStore::new(&path);
        store.save(&sample()).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["name"], "demo");
    }
}
