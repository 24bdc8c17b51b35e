//! Periodic repository monitor.
//!
//! Refreshes the whole collection on a fixed interval, diffs statuses around
//! each cycle and turns newly dirtier repositories into notifications.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch, RwLock};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::models::MonitorSettings;
use crate::domain::ports::Notifier;
use crate::services::change_detector::{detect_changes, StatusChange};
use crate::services::repository_collection::RepositoryCollection;

const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);
const EVENT_CAPACITY: usize = 64;

/// Runtime settings for the monitor loop.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between fast cycles
    pub refresh_interval: Duration,
    /// Whether detected changes reach the notifier
    pub notifications_enabled: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            notifications_enabled: true,
        }
    }
}

impl From<&MonitorSettings> for MonitorConfig {
    fn from(settings: &MonitorSettings) -> Self {
        Self {
            refresh_interval: settings.refresh_interval(),
            notifications_enabled: settings.notifications_enabled,
        }
    }
}

/// Event emitted by the monitor.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// Monitor loop started.
    Started,
    /// A refresh cycle finished.
    CycleCompleted {
        /// Repositories that gained changes
        changes: Vec<StatusChange>,
        /// Wall time of the cycle
        duration_ms: u64,
    },
    /// Monitor loop exited.
    Stopped,
}

/// Status of the monitor.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonitorStatus {
    /// Whether the loop is running
    pub is_monitoring: bool,
    /// End of the last completed cycle
    pub last_update_time: Option<DateTime<Utc>>,
    /// Cycles completed since construction
    pub total_cycles: u64,
}

/// Drives periodic refreshes of a [`RepositoryCollection`].
///
/// Clones share the same loop and status.
#[derive(Clone)]
pub struct RepositoryMonitor {
    shared: Arc<Shared>,
}

struct Shared {
    collection: RepositoryCollection,
    notifier: Arc<dyn Notifier>,
    config: MonitorConfig,
    status: RwLock<MonitorStatus>,
    events: broadcast::Sender<MonitorEvent>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    /// Keeps a forced cycle from overlapping a timed one.
    cycle_lock: tokio::sync::Mutex<()>,
}

impl RepositoryMonitor {
    /// Build a stopped monitor. A zero interval falls back to the default.
    pub fn new(
        collection: RepositoryCollection,
        notifier: Arc<dyn Notifier>,
        mut config: MonitorConfig,
    ) -> Self {
        if config.refresh_interval.is_zero() {
            warn!(
                default_secs = DEFAULT_REFRESH_INTERVAL.as_secs(),
                "refresh interval must be positive, using default"
            );
            config.refresh_interval = DEFAULT_REFRESH_INTERVAL;
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                collection,
                notifier,
                config,
                status: RwLock::new(MonitorStatus::default()),
                events,
                shutdown: Mutex::new(None),
                cycle_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Effective settings.
    pub fn config(&self) -> &MonitorConfig {
        &self.shared.config
    }

    /// Receive monitor events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.shared.events.subscribe()
    }

    /// Current monitor state.
    pub async fn status(&self) -> MonitorStatus {
        self.shared.status.read().await.clone()
    }

    /// Start the loop. The first cycle runs right away. Calling this while
    /// already monitoring does nothing.
    pub async fn start(&self) {
        let receiver = {
            let Ok(mut shutdown) = self.shared.shutdown.lock() else {
                return;
            };
            if shutdown.is_some() {
                debug!("monitor already running");
                return;
            }
            let (sender, receiver) = watch::channel(false);
            *shutdown = Some(sender);
            receiver
        };

        self.shared.status.write().await.is_monitoring = true;
        info!(
            interval_secs = self.shared.config.refresh_interval.as_secs(),
            "monitor started"
        );
        let _ = self.shared.events.send(MonitorEvent::Started);

        let monitor = self.clone();
        tokio::spawn(async move { monitor.run_loop(receiver).await });
    }

    /// Ask the loop to exit. A cycle already underway finishes first. Safe to
    /// call when idle.
    pub async fn stop(&self) {
        let sender = match self.shared.shutdown.lock() {
            Ok(mut shutdown) => shutdown.take(),
            Err(_) => None,
        };

        if let Some(sender) = sender {
            let _ = sender.send(true);
            self.shared.status.write().await.is_monitoring = false;
            info!("monitor stop requested");
        }
    }

    /// Run one cycle now, including a remote fetch.
    pub async fn force_update(&self) -> Vec<StatusChange> {
        self.run_cycle(true).await
    }

    async fn run_loop(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.shared.config.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            if *shutdown.borrow() {
                break;
            }

            self.run_cycle(false).await;
        }

        info!("monitor stopped");
        let _ = self.shared.events.send(MonitorEvent::Stopped);
    }

    async fn run_cycle(&self, should_fetch: bool) -> Vec<StatusChange> {
        let _cycle = self.shared.cycle_lock.lock().await;
        let started = Instant::now();
        let collection = &self.shared.collection;

        let before = collection.snapshot_statuses().await;
        let failures = collection.update_all(should_fetch).await;
        let after = collection.list().await;
        let changes = detect_changes(&before, &after);

        if self.shared.config.notifications_enabled {
            for change in &changes {
                self.shared.notifier.notify(&change.title(), &change.body());
            }
        }

        collection.save().await;

        let duration_ms = started.elapsed().as_millis() as u64;
        {
            let mut status = self.shared.status.write().await;
            status.last_update_time = Some(Utc::now());
            status.total_cycles += 1;
        }

        debug!(
            repositories = after.len(),
            failed = failures.len(),
            changes = changes.len(),
            duration_ms,
            "monitor cycle completed"
        );
        let _ = self.shared.events.send(MonitorEvent::CycleCompleted {
            changes: changes.clone(),
            duration_ms,
        });

        changes
    }
}
