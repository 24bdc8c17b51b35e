//! Detects repositories that gained changes between two refreshes.

use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::models::{Repository, RepositoryStatus};

/// A repository whose working tree got dirtier during one monitor cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    /// Id of the repository that changed
    pub repository_id: Uuid,
    /// Display name at detection time
    pub repository_name: String,
    /// Increase in changed files since the previous snapshot
    pub delta: usize,
    /// Changed files now
    pub total: usize,
}

impl StatusChange {
    /// Notification title.
    pub fn title(&self) -> String {
        format!("{} has changes", self.repository_name)
    }

    /// Notification body.
    pub fn body(&self) -> String {
        format!("{} new changed file(s), {} total", self.delta, self.total)
    }
}

/// Compare `before` with the current repositories.
///
/// A change is reported when the changed-file count went up, or when a clean
/// repository became dirty. Repositories seen for the first time, and those
/// whose count stayed equal or dropped, produce nothing.
pub fn detect_changes(
    before: &HashMap<Uuid, RepositoryStatus>,
    after: &[Repository],
) -> Vec<StatusChange> {
    after
        .iter()
        .filter_map(|repository| {
            let old = before.get(&repository.id)?;
            let new = repository.git_status.as_ref()?;

            let old_total = old.total_changed_files();
            let new_total = new.total_changed_files();
            let became_dirty = !old.has_changes && new.has_changes;

            (new_total > old_total || became_dirty).then(|| StatusChange {
                repository_id: repository.id,
                repository_name: repository.name.clone(),
                delta: new_total.saturating_sub(old_total),
                total: new_total,
            })
        })
        .collect()
}
