//! Command-line host for the status engine.

pub mod commands;
pub mod id_resolver;
pub mod output;
pub mod types;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::notifier::TracingNotifier;
use crate::infrastructure::process::ProcessCommandRunner;
use crate::infrastructure::storage::JsonFileStore;
use crate::services::StatusEngine;

pub use types::{Cli, Commands};

/// Load configuration, merging `explicit` above the per-user file.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => ConfigLoader::load_with_override(path),
        None => ConfigLoader::load(),
    }
}

/// Build an engine backed by the real git executable and the JSON store, and
/// load the persisted repository list.
pub async fn open_engine(config: &Config) -> StatusEngine {
    let store_path = config.storage.repositories_file();
    let engine = StatusEngine::from_config(
        config,
        Arc::new(ProcessCommandRunner::new()),
        Arc::new(JsonFileStore::new(&store_path)),
        Arc::new(TracingNotifier),
    );
    engine.load().await;

    tracing::debug!(store = %store_path.display(), "engine ready");
    engine
}

/// Print an error and exit with a non-zero status.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}

/// Attach a hint to an engine error for display.
pub(crate) fn engine_context<T, E>(result: Result<T, E>, action: &str) -> Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.with_context(|| format!("Failed to {action}"))
}
