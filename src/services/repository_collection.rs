//! The tracked repository collection.
//!
//! Owns the ordered repository list. Every mutation happens under the write
//! half of one `RwLock`; probes run without the lock held and their results
//! are merged in a single write, so readers never observe a half-applied
//! refresh.

use chrono::Utc;
use futures::future::join_all;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{RepositoryError, RepositoryResult};
use crate::domain::models::{Repository, RepositoryStatus, StatusSummary};
use crate::domain::ports::RepositoryStore;
use crate::infrastructure::logging::scrub_credentials;
use crate::services::repository_probe::RepositoryProbe;

/// Cheaply clonable handle to the shared repository list.
#[derive(Clone)]
pub struct RepositoryCollection {
    inner: Arc<Inner>,
}

struct Inner {
    repositories: RwLock<Vec<Repository>>,
    probe: Arc<RepositoryProbe>,
    store: Arc<dyn RepositoryStore>,
    /// Held across snapshot and write so saves land in snapshot order.
    save_lock: Mutex<()>,
}

impl RepositoryCollection {
    /// Empty collection. Call [`load`](Self::load) to restore the persisted list.
    pub fn new(probe: Arc<RepositoryProbe>, store: Arc<dyn RepositoryStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                repositories: RwLock::new(Vec::new()),
                probe,
                store,
                save_lock: Mutex::new(()),
            }),
        }
    }

    /// Start tracking the repository at `path`.
    ///
    /// The entry is appended and persisted immediately with no status; a
    /// background refresh fills it in and persists again.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn add(&self, path: impl AsRef<Path>) -> RepositoryResult<Repository> {
        let path = normalize_path(path.as_ref())?;

        if self.find_by_path(&path).await.is_some() {
            return Err(RepositoryError::AlreadyExists(path));
        }

        self.inner
            .probe
            .validate(&path)
            .map_err(RepositoryError::from_validation)?;

        let repository = Repository::new(path.clone());
        {
            let mut repositories = self.inner.repositories.write().await;
            // Another add may have won the race while we validated.
            if repositories.iter().any(|r| r.path == path) {
                return Err(RepositoryError::AlreadyExists(path));
            }
            repositories.push(repository.clone());
        }

        info!(id = %repository.id, name = %repository.name, "repository added");
        self.save().await;

        let collection = self.clone();
        let id = repository.id;
        tokio::spawn(async move {
            match collection.update_one(id, false).await {
                Ok(()) => collection.save().await,
                Err(e) => warn!(%id, error = %e, "initial refresh failed"),
            }
        });

        Ok(repository)
    }

    /// Stop tracking a repository. Unknown ids are ignored.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: Uuid) {
        let removed = {
            let mut repositories = self.inner.repositories.write().await;
            let before = repositories.len();
            repositories.retain(|r| r.id != id);
            repositories.len() != before
        };

        if removed {
            info!(%id, "repository removed");
            self.save().await;
        }
    }

    /// Refresh one repository and merge the result.
    ///
    /// On failure the stored entity keeps every previously known field. With
    /// `should_fetch` a background fetch follows and its ahead/behind counts
    /// are merged if the repository is still tracked by then.
    #[instrument(skip(self))]
    pub async fn update_one(&self, id: Uuid, should_fetch: bool) -> RepositoryResult<()> {
        let path = self
            .path_of(id)
            .await
            .ok_or(RepositoryError::NotFound(id))?;

        let update = match self.inner.probe.refresh(&path).await {
            Ok(update) => update,
            Err(e) => {
                warn!(
                    %id,
                    path = %path.display(),
                    error = %scrub_credentials(&e.to_string()),
                    "repository refresh failed"
                );
                return Err(e.into());
            }
        };

        {
            let mut repositories = self.inner.repositories.write().await;
            match repositories.iter_mut().find(|r| r.id == id) {
                Some(repository) => repository.apply_update(update, Utc::now()),
                None => debug!(%id, "repository removed during refresh"),
            }
        }

        if should_fetch {
            self.spawn_remote_refresh(id, path);
        }

        Ok(())
    }

    fn spawn_remote_refresh(&self, id: Uuid, path: PathBuf) {
        let collection = self.clone();
        tokio::spawn(async move {
            // Failures are logged inside.
            let _ = collection.refresh_remote_at(id, &path).await;
        });
    }

    /// Slow path for one repository: fetch, recount ahead/behind and merge
    /// the counts. Waits for the network.
    #[instrument(skip(self))]
    pub async fn refresh_remote(&self, id: Uuid) -> RepositoryResult<()> {
        let path = self
            .path_of(id)
            .await
            .ok_or(RepositoryError::NotFound(id))?;
        self.refresh_remote_at(id, &path).await
    }

    async fn refresh_remote_at(&self, id: Uuid, path: &Path) -> RepositoryResult<()> {
        let difference = self.inner.probe.refresh_remote(path).await.map_err(|e| {
            warn!(%id, error = %scrub_credentials(&e.to_string()), "remote refresh failed");
            RepositoryError::from(e)
        })?;

        let mut repositories = self.inner.repositories.write().await;
        if let Some(repository) = repositories.iter_mut().find(|r| r.id == id) {
            repository.apply_commit_difference(difference);
        }
        Ok(())
    }

    /// Refresh every repository concurrently and wait for all of them.
    ///
    /// Returns the failures; one repository failing never stops the others.
    pub async fn update_all(&self, should_fetch: bool) -> Vec<(Uuid, RepositoryError)> {
        let ids: Vec<Uuid> = self.inner.repositories.read().await.iter().map(|r| r.id).collect();

        let results = join_all(ids.iter().map(|&id| self.update_one(id, should_fetch))).await;

        let failures: Vec<(Uuid, RepositoryError)> = ids
            .into_iter()
            .zip(results)
            .filter_map(|(id, result)| result.err().map(|e| (id, e)))
            .collect();

        debug!(failed = failures.len(), "refresh of all repositories finished");
        failures
    }

    /// Fast-forward pull, then refresh. `is_pulling` is set for the duration
    /// and cleared however the pull ends.
    #[instrument(skip(self))]
    pub async fn pull(&self, id: Uuid) -> RepositoryResult<String> {
        let path = {
            let mut repositories = self.inner.repositories.write().await;
            let repository = repositories
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(RepositoryError::NotFound(id))?;
            repository.is_pulling = true;
            repository.path.clone()
        };

        let result = match self.inner.probe.pull(&path).await {
            Ok(output) => {
                info!(%id, "pull completed");
                if let Err(e) = self.update_one(id, false).await {
                    warn!(%id, error = %e, "refresh after pull failed");
                }
                Ok(output)
            }
            Err(e) => {
                warn!(%id, error = %scrub_credentials(&e.to_string()), "pull failed");
                Err(e.into())
            }
        };

        self.set_pulling(id, false).await;
        result
    }

    async fn set_pulling(&self, id: Uuid, pulling: bool) {
        let mut repositories = self.inner.repositories.write().await;
        if let Some(repository) = repositories.iter_mut().find(|r| r.id == id) {
            repository.is_pulling = pulling;
        }
    }

    /// Persist the current list. Failures are logged, never returned.
    pub async fn save(&self) {
        let _saving = self.inner.save_lock.lock().await;
        let snapshot = self.list().await;
        if let Err(e) = self.inner.store.save(&snapshot).await {
            error!(error = %e, "failed to save repositories");
        }
    }

    /// Replace the in-memory list with the persisted one.
    ///
    /// A missing or unreadable document leaves the collection empty.
    pub async fn load(&self) {
        let loaded = match self.inner.store.load().await {
            Ok(repositories) => repositories,
            Err(e) => {
                error!(error = %e, "failed to load repositories, starting empty");
                Vec::new()
            }
        };

        info!(count = loaded.len(), "repositories loaded");
        *self.inner.repositories.write().await = loaded;
    }

    /// Drop every repository and persist the empty list.
    pub async fn clear_all(&self) {
        self.inner.repositories.write().await.clear();
        self.inner.probe.clear_cache();
        self.save().await;
    }

    /// Snapshot of the list in display order.
    pub async fn list(&self) -> Vec<Repository> {
        self.inner.repositories.read().await.clone()
    }

    /// Copy of the repository with `id`.
    pub async fn get(&self, id: Uuid) -> Option<Repository> {
        self.inner
            .repositories
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Look up by path, normalized the same way [`add`](Self::add) does.
    pub async fn find_by_path(&self, path: impl AsRef<Path>) -> Option<Repository> {
        let path = normalize_path(path.as_ref()).ok()?;
        self.inner
            .repositories
            .read()
            .await
            .iter()
            .find(|r| r.path == path)
            .cloned()
    }

    /// Number of tracked repositories.
    pub async fn len(&self) -> usize {
        self.inner.repositories.read().await.len()
    }

    /// Whether nothing is tracked.
    pub async fn is_empty(&self) -> bool {
        self.inner.repositories.read().await.is_empty()
    }

    /// Statuses of every repository that has been refreshed at least once.
    pub async fn snapshot_statuses(&self) -> HashMap<Uuid, RepositoryStatus> {
        self.inner
            .repositories
            .read()
            .await
            .iter()
            .filter_map(|r| r.git_status.clone().map(|s| (r.id, s)))
            .collect()
    }

    /// Aggregate over the current list.
    pub async fn status_summary(&self) -> StatusSummary {
        StatusSummary::from_repositories(&self.inner.repositories.read().await)
    }

    async fn path_of(&self, id: Uuid) -> Option<PathBuf> {
        self.inner
            .repositories
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.path.clone())
    }
}

/// Make `path` absolute and resolve `.` and `..` lexically.
///
/// Symlinks are left alone, so two spellings of the same directory through
/// different links count as different repositories.
pub fn normalize_path(path: &Path) -> RepositoryResult<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(RepositoryError::InvalidPath(path.to_path_buf()));
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|_| RepositoryError::InvalidPath(path.to_path_buf()))?
            .join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never climb above the root.
                if normalized.parent().is_some() {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    Ok(normalized)
}
