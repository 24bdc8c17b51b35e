//! Repository list persistence port.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::models::Repository;

/// Errors raised by a persistence adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document could not be encoded or decoded.
    #[error("Malformed repository data: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable storage for the ordered repository list.
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    /// Load the stored list. A store that holds nothing yet returns an empty list.
    async fn load(&self) -> Result<Vec<Repository>, StorageError>;

    /// Replace the stored list with `repositories`.
    async fn save(&self, repositories: &[Repository]) -> Result<(), StorageError>;
}

/// Store that keeps the list in memory only.
///
/// Used by tests and by sessions that should not touch the user's data
/// directory.
#[derive(Debug, Default)]
pub struct InMemoryRepositoryStore {
    repositories: Mutex<Vec<Repository>>,
}

impl InMemoryRepositoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RepositoryStore for InMemoryRepositoryStore {
    async fn load(&self) -> Result<Vec<Repository>, StorageError> {
        Ok(self.repositories.lock().await.clone())
    }

    async fn save(&self, repositories: &[Repository]) -> Result<(), StorageError> {
        *self.repositories.lock().await = repositories.to_vec();
        Ok(())
    }
}
