//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces that infrastructure adapters implement:
//! - CommandRunner: running the `git` executable with a deadline
//! - RepositoryStore: loading and saving the tracked repository list
//! - Notifier: delivering change notifications to the user
//!
//! These traits keep the services independent of processes, files and the
//! desktop notification facility, and let tests substitute scripted doubles.

pub mod command_runner;
pub mod notifier;
pub mod repository_store;

pub use command_runner::{command_line, CommandRunner};
pub use notifier::{Notifier, NullNotifier};
pub use repository_store::{InMemoryRepositoryStore, RepositoryStore, StorageError};
