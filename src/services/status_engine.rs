//! Facade consumed by the UI layer.
//!
//! Wraps the collection and the monitor behind the read and write calls a
//! front end needs, and keeps the last user-facing error message.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::errors::{RepositoryError, RepositoryResult};
use crate::domain::models::{Config, Repository, StatusSummary};
use crate::domain::ports::{CommandRunner, Notifier, NullNotifier, RepositoryStore};
use crate::infrastructure::logging::scrub_credentials;
use crate::services::change_detector::StatusChange;
use crate::services::monitor::{MonitorConfig, MonitorEvent, MonitorStatus, RepositoryMonitor};
use crate::services::repository_collection::RepositoryCollection;
use crate::services::repository_probe::RepositoryProbe;

/// Entry point for front ends.
pub struct StatusEngine {
    collection: RepositoryCollection,
    monitor: RepositoryMonitor,
    last_error: RwLock<Option<String>>,
    refreshing: AtomicBool,
}

/// Clears the in-progress flag however `refresh_all` exits.
struct RefreshGuard<'a>(&'a AtomicBool);

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl StatusEngine {
    /// Engine over an existing collection and monitor.
    pub fn new(collection: RepositoryCollection, monitor: RepositoryMonitor) -> Self {
        Self {
            collection,
            monitor,
            last_error: RwLock::new(None),
            refreshing: AtomicBool::new(false),
        }
    }

    /// Wire the engine from configuration and the three adapters.
    ///
    /// The notifier is replaced by [`NullNotifier`] when notifications are
    /// disabled.
    pub fn from_config(
        config: &Config,
        runner: Arc<dyn CommandRunner>,
        store: Arc<dyn RepositoryStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let probe = Arc::new(RepositoryProbe::new(runner, config.git.clone()));
        let collection = RepositoryCollection::new(probe, store);

        let notifier: Arc<dyn Notifier> = if config.monitor.notifications_enabled {
            notifier
        } else {
            Arc::new(NullNotifier)
        };
        let monitor = RepositoryMonitor::new(
            collection.clone(),
            notifier,
            MonitorConfig::from(&config.monitor),
        );

        Self::new(collection, monitor)
    }

    /// Underlying collection, for hosts that drive refreshes themselves.
    pub fn collection(&self) -> &RepositoryCollection {
        &self.collection
    }

    /// Load the persisted repository list.
    pub async fn load(&self) {
        self.collection.load().await;
    }

    // Read API

    /// Every tracked repository in display order.
    pub async fn list_repositories(&self) -> Vec<Repository> {
        self.collection.list().await
    }

    /// Title and icon state for the status item.
    pub async fn status_summary(&self) -> StatusSummary {
        self.collection.status_summary().await
    }

    /// Message of the last failed user operation, if not yet acknowledged.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().ok().and_then(|slot| slot.clone())
    }

    /// Clear the error slot once the message was shown.
    pub fn acknowledge_error(&self) {
        self.set_error(None);
    }

    /// Whether the monitor runs, and when it last completed a cycle.
    pub async fn monitor_status(&self) -> MonitorStatus {
        self.monitor.status().await
    }

    /// Receiver for monitor events.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.monitor.subscribe()
    }

    // Write API

    /// Track the repository at `path`.
    pub async fn add_repository(&self, path: impl AsRef<Path>) -> RepositoryResult<Repository> {
        self.record(self.collection.add(path).await)
    }

    /// Stop tracking `id`. Unknown ids are ignored.
    pub async fn remove_repository(&self, id: Uuid) {
        self.collection.remove(id).await;
        self.set_error(None);
    }

    /// Refresh one repository, including a background fetch, and persist.
    #[instrument(skip(self))]
    pub async fn refresh_one(&self, id: Uuid) -> RepositoryResult<()> {
        let result = self.collection.update_one(id, true).await;
        if result.is_ok() {
            self.collection.save().await;
        }
        self.record(result)
    }

    /// Run a full cycle with remote fetches.
    ///
    /// Returns `None` without doing anything when another `refresh_all` is
    /// still running.
    pub async fn refresh_all(&self) -> Option<Vec<StatusChange>> {
        if self.refreshing.swap(true, Ordering::AcqRel) {
            debug!("refresh already in progress, skipping");
            return None;
        }
        let _guard = RefreshGuard(&self.refreshing);

        let changes = self.monitor.force_update().await;
        self.set_error(None);
        Some(changes)
    }

    /// Fast-forward pull. Returns git's output.
    pub async fn pull(&self, id: Uuid) -> RepositoryResult<String> {
        self.record(self.collection.pull(id).await)
    }

    /// Start periodic monitoring. Idempotent.
    pub async fn start(&self) {
        self.monitor.start().await;
    }

    /// Stop periodic monitoring; a running cycle completes.
    pub async fn stop(&self) {
        self.monitor.stop().await;
    }

    fn record<T>(&self, result: RepositoryResult<T>) -> RepositoryResult<T> {
        match &result {
            Ok(_) => self.set_error(None),
            Err(e) => self.set_error(Some(user_message(e))),
        }
        result
    }

    fn set_error(&self, message: Option<String>) {
        if let Ok(mut slot) = self.last_error.write() {
            *slot = message;
        }
    }
}

/// Short message for display, with any credentials in URLs removed.
fn user_message(err: &RepositoryError) -> String {
    let message = match err {
        RepositoryError::Git(git) => match git.failure_reason() {
            Some(reason) => format!("{git}. {reason}"),
            None => git.to_string(),
        },
        other => other.to_string(),
    };
    scrub_credentials(&message)
}
