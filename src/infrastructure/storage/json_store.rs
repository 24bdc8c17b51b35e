//! JSON file persistence for the tracked repository list.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::domain::models::Repository;
use crate::domain::ports::{RepositoryStore, StorageError};

/// Stores the repository list as one pretty-printed JSON array.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash mid-write leaves the previous document in place. Concurrent saves
/// are serialized.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Store backed by the file at `path`. Nothing is touched until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the JSON document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "repositories.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RepositoryStore for JsonFileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Vec<Repository>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no repositories file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let repositories: Vec<Repository> = serde_json::from_slice(&bytes)?;
        debug!(count = repositories.len(), "loaded repositories");
        Ok(repositories)
    }

    #[instrument(skip(self, repositories), fields(path = %self.path.display(), count = repositories.len()))]
    async fn save(&self, repositories: &[Repository]) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(repositories)?;

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!("saved repositories");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RepositoryStatus;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_order_and_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/deeper/repos.json"));

        let mut first = Repository::new("/work/alpha");
        first.git_status = Some(RepositoryStatus::new(vec![], vec!["x".into()], vec![]));
        first.is_pulling = true;
        let second = Repository::new("/work/beta").with_name("Beta");

        store.save(&[first.clone(), second.clone()]).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, first.id);
        assert_eq!(loaded[0].path, first.path);
        assert_eq!(loaded[0].git_status, first.git_status);
        assert!(!loaded[0].is_pulling);
        assert_eq!(loaded[1].id, second.id);
        assert_eq!(loaded[1].name, "Beta");
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_output_is_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("repos.json"));
        store.save(&[Repository::new("/work/alpha")]).await.unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("[\n"));
        assert!(text.contains("\"path\": \"/work/alpha\""));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(StorageError::Serialization(_))
        ));
    }
}
