//! Services layer
//!
//! The repository status engine proper:
//! - `status_parser`: porcelain output to [`RepositoryStatus`](crate::domain::models::RepositoryStatus)
//! - `repository_probe`: concurrent git queries for one repository
//! - `repository_collection`: the tracked list, its refreshes and persistence
//! - `change_detector` and `monitor`: periodic refresh with change notifications
//! - `status_engine`: the facade front ends talk to

pub mod change_detector;
pub mod monitor;
pub mod repository_collection;
pub mod repository_probe;
pub mod status_engine;
pub mod status_parser;

#[cfg(test)]
pub(crate) mod test_support;

pub use change_detector::{detect_changes, StatusChange};
pub use monitor::{MonitorConfig, MonitorEvent, MonitorStatus, RepositoryMonitor};
pub use repository_collection::{normalize_path, RepositoryCollection};
pub use repository_probe::RepositoryProbe;
pub use status_engine::StatusEngine;
