//! repolens - live status of a set of local Git repositories
//!
//! repolens tracks a list of working directories (including linked
//! worktrees) and keeps, for each one, its current branch, staged, modified
//! and untracked files, commits ahead of and behind its upstream, and its
//! worktrees. A monitor refreshes everything on an interval and raises a
//! notification when a repository picks up new changes.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, error taxonomy and port traits
//! - **Service Layer** (`services`): probing, the tracked collection, the monitor
//! - **Infrastructure Layer** (`infrastructure`): git process runner, JSON store,
//!   configuration, logging
//! - **CLI Layer** (`cli`): command-line host
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use repolens::infrastructure::{JsonFileStore, ProcessCommandRunner, TracingNotifier};
//! use repolens::{Config, StatusEngine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let engine = StatusEngine::from_config(
//!         &config,
//!         Arc::new(ProcessCommandRunner::new()),
//!         Arc::new(JsonFileStore::new(config.storage.repositories_file())),
//!         Arc::new(TracingNotifier),
//!     );
//!     engine.load().await;
//!     engine.add_repository("/path/to/repo").await.ok();
//!     println!("{}", engine.status_summary().await.title());
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{GitError, RepositoryError};
pub use domain::models::{
    CommitDifference, Config, Repository, RepositoryStatus, StatusSummary, Worktree,
};
pub use infrastructure::config::ConfigLoader;
pub use services::{MonitorEvent, RepositoryCollection, RepositoryMonitor, StatusChange, StatusEngine};
