//! Working-tree status snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable snapshot of a repository's working-tree changes.
///
/// File lists hold repository-relative paths in the order git reported
/// them. A path may appear in more than one category (staged and modified
/// at the same time) but never twice in the same one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStatus {
    /// True iff any of the three lists is non-empty
    pub has_changes: bool,
    /// Paths with changes in the index
    pub staged_files: Vec<String>,
    /// Paths changed in the working tree only, or with an unrecognised code
    pub modified_files: Vec<String>,
    /// Paths git does not track
    pub untracked_files: Vec<String>,
}

impl RepositoryStatus {
    /// Build a status from its three buckets, deriving `has_changes`.
    pub fn new(
        staged_files: Vec<String>,
        modified_files: Vec<String>,
        untracked_files: Vec<String>,
    ) -> Self {
        let has_changes =
            !staged_files.is_empty() || !modified_files.is_empty() || !untracked_files.is_empty();
        Self {
            has_changes,
            staged_files,
            modified_files,
            untracked_files,
        }
    }

    /// A status with no changes at all.
    pub fn clean() -> Self {
        Self::default()
    }

    /// Total number of changed files across all categories.
    pub fn total_changed_files(&self) -> usize {
        self.staged_files.len() + self.modified_files.len() + self.untracked_files.len()
    }

    /// Inverse of `has_changes`.
    pub fn is_clean(&self) -> bool {
        !self.has_changes
    }

    /// Staged, then modified, then untracked paths.
    pub fn all_changed_files(&self) -> Vec<&str> {
        self.staged_files
            .iter()
            .chain(&self.modified_files)
            .chain(&self.untracked_files)
            .map(String::as_str)
            .collect()
    }
}

impl fmt::Display for RepositoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RepositoryStatus(staged: {}, modified: {}, untracked: {})",
            self.staged_files.len(),
            self.modified_files.len(),
            self.untracked_files.len()
        )
    }
}
