//! One-shot status overview.

use anyhow::Result;
use serde::Serialize;

use crate::cli::open_engine;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{Config, Repository, StatusSummary};

/// Result of `repolens status`.
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    /// Aggregate title and icon state
    pub summary: StatusSummary,
    /// Every tracked repository after the refresh
    pub repositories: Vec<Repository>,
    /// Repositories whose refresh failed, with the reason
    pub errors: Vec<RefreshFailure>,
}

/// A repository whose refresh failed.
#[derive(Debug, Serialize)]
pub struct RefreshFailure {
    /// Display name, or id when the repository vanished
    pub name: String,
    /// Error message
    pub error: String,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let mut out = format!("{} {}", self.summary.icon(), self.summary.title());
        if !self.repositories.is_empty() {
            out.push('\n');
            out.push_str(&TableFormatter::new().format_repositories(&self.repositories));
        }
        for failure in &self.errors {
            out.push_str(&format!("\n! {}: {}", failure.name, failure.error));
        }
        out
    }
}

/// Refresh every tracked repository (local state only) and print the result.
pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let engine = open_engine(config).await;
    let collection = engine.collection();

    let failures = collection.update_all(false).await;
    collection.save().await;

    let repositories = engine.list_repositories().await;
    let errors = failures
        .into_iter()
        .map(|(id, err)| RefreshFailure {
            name: repositories
                .iter()
                .find(|r| r.id == id)
                .map_or_else(|| id.to_string(), |r| r.name.clone()),
            error: err.to_string(),
        })
        .collect();

    let out = StatusOutput {
        summary: StatusSummary::from_repositories(&repositories),
        repositories,
        errors,
    };
    output(&out, json_mode);
    Ok(())
}
