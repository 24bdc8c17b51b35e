//! CLI command implementations.

pub mod config;
pub mod repo;
pub mod status;
pub mod watch;
