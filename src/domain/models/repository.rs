//! Tracked repository domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::git_status::RepositoryStatus;

/// A working directory attached to a repository, as listed by
/// `git worktree list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worktree {
    /// Absolute directory of the worktree
    pub path: PathBuf,
    /// Checked-out branch (short name), `(detached)` or `(bare)`
    pub branch: String,
    /// Commit hash at HEAD
    pub commit: String,
    /// Whether this is the main checkout (first entry reported by git)
    pub is_main: bool,
}

/// Divergence between the local branch and its upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDifference {
    /// Local commits not on the upstream
    pub ahead: u32,
    /// Upstream commits not on the local branch
    pub behind: u32,
}

impl CommitDifference {
    /// Counts as reported by `rev-list --left-right --count`.
    pub const fn new(ahead: u32, behind: u32) -> Self {
        Self { ahead, behind }
    }
}

/// Everything a single fast-path refresh learns about a repository.
///
/// Merged into the stored [`Repository`] in one step so readers never see a
/// half-refreshed entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryUpdate {
    /// Working-tree changes
    pub status: RepositoryStatus,
    /// Current branch, or a fallback when detached
    pub branch: String,
    /// URL of `origin`, if configured
    pub remote_url: Option<String>,
    /// All worktrees, main first
    pub worktrees: Vec<Worktree>,
    /// Ahead/behind against the upstream
    pub commit_difference: CommitDifference,
    /// Whether the path is a linked worktree
    pub is_worktree: bool,
    /// Main worktree, for linked worktrees only
    pub main_worktree_path: Option<PathBuf>,
}

/// A git repository tracked by the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Unique identifier
    pub id: Uuid,
    /// Normalized absolute path (unique within the collection)
    pub path: PathBuf,
    /// Display name, defaults to the last path component
    pub name: String,
    /// Branch at the last successful refresh
    #[serde(default)]
    pub current_branch: Option<String>,
    /// Changes at the last successful refresh
    #[serde(default)]
    pub git_status: Option<RepositoryStatus>,
    /// Time of the last successful refresh
    #[serde(default)]
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// URL of `origin`
    #[serde(default)]
    pub remote_url: Option<String>,
    /// Worktrees sharing this repository
    #[serde(default)]
    pub worktrees: Option<Vec<Worktree>>,
    /// Whether the path is a linked worktree
    #[serde(default)]
    pub is_worktree: Option<bool>,
    /// Main worktree of a linked worktree
    #[serde(default)]
    pub main_worktree_path: Option<PathBuf>,
    /// Upstream commits not yet pulled
    #[serde(default)]
    pub commits_behind: Option<u32>,
    /// Local commits not yet pushed
    #[serde(default)]
    pub commits_ahead: Option<u32>,
    /// Set while a pull is running. Never persisted.
    #[serde(skip)]
    pub is_pulling: bool,
}

impl Repository {
    /// Create a repository entry with no known state yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = default_name(&path);
        Self {
            id: Uuid::new_v4(),
            path,
            name,
            current_branch: None,
            git_status: None,
            last_fetched_at: None,
            remote_url: None,
            worktrees: None,
            is_worktree: None,
            main_worktree_path: None,
            commits_behind: None,
            commits_ahead: None,
            is_pulling: false,
        }
    }

    /// Override the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Merge the result of a fast-path refresh.
    pub fn apply_update(&mut self, update: RepositoryUpdate, fetched_at: DateTime<Utc>) {
        self.git_status = Some(update.status);
        self.current_branch = Some(update.branch);
        self.remote_url = update.remote_url;
        self.worktrees = Some(update.worktrees);
        self.is_worktree = Some(update.is_worktree);
        self.main_worktree_path = update.main_worktree_path;
        self.apply_commit_difference(update.commit_difference);
        self.last_fetched_at = Some(fetched_at);
    }

    /// Merge ahead/behind counts from a fetch.
    pub fn apply_commit_difference(&mut self, difference: CommitDifference) {
        self.commits_ahead = Some(difference.ahead);
        self.commits_behind = Some(difference.behind);
    }

    /// Whether the last known status has any change. False before the first refresh.
    pub fn has_changes(&self) -> bool {
        self.git_status.as_ref().is_some_and(|s| s.has_changes)
    }

    /// Browsable HTTPS address derived from the remote URL.
    ///
    /// `git@host:owner/repo.git` becomes `https://host/owner/repo`, HTTPS
    /// remotes lose their `.git` suffix, anything else is returned as is.
    pub fn web_url(&self) -> Option<String> {
        let remote = self.remote_url.as_deref()?.trim();
        if remote.is_empty() {
            return None;
        }

        if let Some(rest) = remote.strip_prefix("git@") {
            if let Some((host, repo_path)) = rest.split_once(':') {
                return Some(format!("https://{host}/{}", strip_git_suffix(repo_path)));
            }
        }

        if remote.starts_with("https://") {
            return Some(strip_git_suffix(remote).to_string());
        }

        Some(remote.to_string())
    }
}

fn strip_git_suffix(s: &str) -> &str {
    s.strip_suffix(".git").unwrap_or(s)
}

fn default_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Aggregate view used by the UI for its title and icon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    /// Number of tracked repositories
    pub count: usize,
    /// Whether any repository has changes
    pub has_changes: bool,
}

impl StatusSummary {
    /// Summarize `repositories`.
    pub fn from_repositories(repositories: &[Repository]) -> Self {
        Self {
            count: repositories.len(),
            has_changes: repositories.iter().any(Repository::has_changes),
        }
    }

    /// Status item title: the app name, with the count when non-zero.
    pub fn title(&self) -> String {
        if self.count == 0 {
            "repolens".to_string()
        } else {
            format!("repolens ({})", self.count)
        }
    }

    /// Symbol name for the status item.
    pub fn icon(&self) -> &'static str {
        if self.has_changes {
            "folder.badge.gear"
        } else {
            "folder"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_update() -> RepositoryUpdate {
        RepositoryUpdate {
            status: RepositoryStatus::new(vec!["a.txt".to_string()], vec![], vec![]),
            branch: "develop".to_string(),
            remote_url: Some("git@github.com:owner/repo.git".to_string()),
            worktrees: vec![Worktree {
                path: PathBuf::from("/work/repo"),
                branch: "develop".to_string(),
                commit: "abc123".to_string(),
                is_main: true,
            }],
            commit_difference: CommitDifference::new(2, 1),
            is_worktree: false,
            main_worktree_path: None,
        }
    }

    #[test]
    fn test_new_defaults_name_to_last_component() {
        let repo = Repository::new("/Users/dev/projects/my-repo");
        assert_eq!(repo.name, "my-repo");
        assert!(repo.current_branch.is_none());
        assert!(repo.git_status.is_none());
        assert!(!repo.is_pulling);
    }

    #[test]
    fn test_with_name() {
        let repo = Repository::new("/tmp/repo").with_name("Custom");
        assert_eq!(repo.name, "Custom");
    }

    #[test]
    fn test_unique_ids() {
        let a = Repository::new("/tmp/repo");
        let b = Repository::new("/tmp/repo");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_apply_update() {
        let mut repo = Repository::new("/work/repo");
        let now = Utc::now();
        repo.apply_update(sample_update(), now);

        assert_eq!(repo.current_branch.as_deref(), Some("develop"));
        assert!(repo.has_changes());
        assert_eq!(repo.commits_ahead, Some(2));
        assert_eq!(repo.commits_behind, Some(1));
        assert_eq!(repo.worktrees.as_ref().map(Vec::len), Some(1));
        assert_eq!(repo.is_worktree, Some(false));
        assert_eq!(repo.last_fetched_at, Some(now));
    }

    #[test]
    fn test_is_pulling_is_not_persisted() {
        let mut repo = Repository::new("/work/repo");
        repo.is_pulling = true;

        let json = serde_json::to_string(&repo).unwrap();
        assert!(!json.contains("is_pulling"));

        let decoded: Repository = serde_json::from_str(&json).unwrap();
        assert!(!decoded.is_pulling);
        assert_eq!(decoded.id, repo.id);
    }

    #[test]
    fn test_decode_minimal_document() {
        let json = r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","path":"/a/b","name":"b"}"#;
        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.name, "b");
        assert!(repo.worktrees.is_none());
    }

    #[test]
    fn test_web_url_conversions() {
        let mut repo = Repository::new("/r");
        assert_eq!(repo.web_url(), None);

        repo.remote_url = Some("git@github.com:owner/repo.git".to_string());
        assert_eq!(repo.web_url().as_deref(), Some("https://github.com/owner/repo"));

        repo.remote_url = Some("https://gitlab.com/group/project.git".to_string());
        assert_eq!(repo.web_url().as_deref(), Some("https://gitlab.com/group/project"));

        repo.remote_url = Some("ssh://git@host/x.git".to_string());
        assert_eq!(repo.web_url().as_deref(), Some("ssh://git@host/x.git"));
    }

    #[test]
    fn test_status_summary() {
        let empty = StatusSummary::from_repositories(&[]);
        assert_eq!(empty.title(), "repolens");
        assert_eq!(empty.icon(), "folder");

        let mut dirty = Repository::new("/a");
        dirty.apply_update(sample_update(), Utc::now());
        let clean = Repository::new("/b");

        let summary = StatusSummary::from_repositories(&[clean, dirty]);
        assert_eq!(summary.count, 2);
        assert!(summary.has_changes);
        assert_eq!(summary.title(), "repolens (2)");
        assert_eq!(summary.icon(), "folder.badge.gear");
    }
}
