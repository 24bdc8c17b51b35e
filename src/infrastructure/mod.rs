//! Infrastructure layer module
//!
//! Adapters that satisfy the domain ports, plus process-wide plumbing:
//! - Process execution of `git` with deadlines
//! - JSON file persistence of the repository list
//! - Notification delivery
//! - Configuration loading (figment)
//! - Logging (tracing)

pub mod config;
pub mod logging;
pub mod notifier;
pub mod process;
pub mod storage;

pub use notifier::TracingNotifier;
pub use process::ProcessCommandRunner;
pub use storage::JsonFileStore;
