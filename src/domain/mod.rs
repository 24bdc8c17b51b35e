//! Domain layer for the repository status engine
//!
//! This module contains the value types, entity and error taxonomy, plus the
//! port traits the services depend on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{GitError, GitResult, RepositoryError, RepositoryResult};
