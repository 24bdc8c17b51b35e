//! Domain models: repository entity, status snapshot and configuration.

pub mod config;
pub mod git_status;
pub mod repository;

pub use config::{
    Config, GitConfig, LoggingConfig, MonitorSettings, StorageConfig, MAX_REFRESH_INTERVAL_SECS,
    MIN_REFRESH_INTERVAL_SECS,
};
pub use git_status::RepositoryStatus;
pub use repository::{
    CommitDifference, Repository, RepositoryUpdate, StatusSummary, Worktree,
};
