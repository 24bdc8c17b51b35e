//! Repository lookup for CLI arguments.
//!
//! Accepts a full id, any unique id prefix (like git short hashes), a
//! display name or a path.

use anyhow::{bail, Result};
use std::path::Path;
use uuid::Uuid;

use crate::domain::models::Repository;
use crate::services::normalize_path;

/// Resolve `query` to the id of one tracked repository.
pub fn resolve_repository(repositories: &[Repository], query: &str) -> Result<Uuid> {
    let query = query.trim();
    if query.is_empty() {
        bail!("Repository reference must not be empty");
    }

    if let Ok(id) = Uuid::parse_str(query) {
        if repositories.iter().any(|r| r.id == id) {
            return Ok(id);
        }
        bail!("No repository found with id {id}");
    }

    let by_name: Vec<&Repository> = repositories.iter().filter(|r| r.name == query).collect();
    match by_name.as_slice() {
        [only] => return Ok(only.id),
        [] => {}
        _ => bail!(
            "Name '{}' is ambiguous ({} repositories). Use the id instead.",
            query,
            by_name.len()
        ),
    }

    if let Ok(path) = normalize_path(Path::new(query)) {
        if let Some(repository) = repositories.iter().find(|r| r.path == path) {
            return Ok(repository.id);
        }
    }

    if query.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        let prefix = query.to_lowercase();
        let matches: Vec<&Repository> = repositories
            .iter()
            .filter(|r| r.id.to_string().starts_with(&prefix))
            .collect();

        match matches.as_slice() {
            [only] => return Ok(only.id),
            [] => {}
            _ => {
                let candidates: Vec<String> = matches
                    .iter()
                    .map(|r| format!("  {} ({})", r.id, r.name))
                    .collect();
                bail!(
                    "Ambiguous id prefix '{}' matches {} repositories:\n{}",
                    query,
                    matches.len(),
                    candidates.join("\n")
                );
            }
        }
    }

    bail!("No repository matches '{query}'")
}
