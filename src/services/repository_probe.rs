//! Repository probe.
//!
//! Answers "what does this repository look like right now" by running a
//! handful of read-only git commands concurrently and folding their output
//! into a [`RepositoryUpdate`].

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::domain::errors::{GitError, GitResult};
use crate::domain::models::{
    CommitDifference, GitConfig, RepositoryStatus, RepositoryUpdate, Worktree,
};
use crate::domain::ports::CommandRunner;
use crate::infrastructure::logging::scrub_credentials;
use crate::services::status_parser;

const DEFAULT_BRANCH: &str = "main";

/// Failure output of `git remote get-url origin` meaning "there is no origin".
const NO_REMOTE_PATTERNS: &[&str] = &["No such remote", "not a git repository"];

/// Failure output of the ahead/behind count meaning "nothing to compare with".
const NO_UPSTREAM_PATTERNS: &[&str] = &[
    "no upstream",
    "no such branch",
    "unknown revision",
    "does not point to a branch",
    "ambiguous argument",
];

/// Runs git against a single working directory.
pub struct RepositoryProbe {
    runner: Arc<dyn CommandRunner>,
    config: GitConfig,
    /// Path -> "has a `.git` entry". Only ever appended to or overwritten.
    validation_cache: RwLock<HashMap<PathBuf, bool>>,
}

impl RepositoryProbe {
    /// Probe running `config.executable` through `runner`.
    pub fn new(runner: Arc<dyn CommandRunner>, config: GitConfig) -> Self {
        Self {
            runner,
            config,
            validation_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Check that `path` is an existing directory holding a `.git` entry
    /// (a directory for a main checkout, a file for a linked worktree).
    pub fn validate(&self, path: &Path) -> GitResult<()> {
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => GitError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => GitError::InvalidPath(path.to_path_buf()),
        })?;
        if !metadata.is_dir() {
            return Err(GitError::InvalidPath(path.to_path_buf()));
        }

        let cached = self
            .validation_cache
            .read()
            .ok()
            .and_then(|cache| cache.get(path).copied());

        let is_repository = match cached {
            Some(valid) => valid,
            None => {
                let valid = path.join(".git").exists();
                if let Ok(mut cache) = self.validation_cache.write() {
                    cache.insert(path.to_path_buf(), valid);
                }
                valid
            }
        };

        if is_repository {
            Ok(())
        } else {
            Err(GitError::InvalidRepository {
                path: path.to_path_buf(),
            })
        }
    }

    /// Forget every cached validation result.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.validation_cache.write() {
            cache.clear();
        }
    }

    /// Fast-path refresh: local queries only, never touches the network.
    ///
    /// The five queries run concurrently and the first mandatory failure
    /// fails the whole refresh.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn refresh(&self, path: &Path) -> GitResult<RepositoryUpdate> {
        self.validate(path)?;

        let (status, branch, remote_url, worktrees, commit_difference) = tokio::try_join!(
            self.status(path),
            self.current_branch(path),
            self.remote_url(path),
            self.worktrees(path),
            self.commit_difference(path),
        )?;

        let is_worktree = path.join(".git").is_file();
        let main_worktree_path = if is_worktree {
            worktrees
                .iter()
                .find(|w| w.is_main)
                .map(|w| w.path.clone())
        } else {
            None
        };

        debug!(
            branch = %branch,
            changes = status.total_changed_files(),
            ahead = commit_difference.ahead,
            behind = commit_difference.behind,
            worktrees = worktrees.len(),
            "repository probed"
        );

        Ok(RepositoryUpdate {
            status,
            branch,
            remote_url,
            worktrees,
            commit_difference,
            is_worktree,
            main_worktree_path,
        })
    }

    /// Slow path: fetch from the remote, then recount ahead/behind.
    ///
    /// A failed fetch is logged and the recount still runs against whatever
    /// remote-tracking refs are present.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn refresh_remote(&self, path: &Path) -> GitResult<CommitDifference> {
        self.validate(path)?;

        if let Err(e) = self.fetch(path).await {
            warn!(error = %scrub_credentials(&e.to_string()), "fetch failed");
        }
        self.commit_difference(path).await
    }

    /// `git fetch --quiet` with the fetch timeout.
    pub async fn fetch(&self, path: &Path) -> GitResult<()> {
        self.git(path, &["fetch", "--quiet"], self.config.fetch_timeout())
            .await
            .map(|_| ())
    }

    /// Fast-forward-only pull. Returns git's trimmed output.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn pull(&self, path: &Path) -> GitResult<String> {
        self.validate(path)?;

        let output = self
            .git(path, &["pull", "--ff-only"], self.config.pull_timeout())
            .await?;
        Ok(output.trim().to_string())
    }

    async fn git(&self, path: &Path, args: &[&str], timeout: Duration) -> GitResult<String> {
        self.runner
            .execute(&self.config.executable, args, path, timeout)
            .await
    }

    async fn local(&self, path: &Path, args: &[&str]) -> GitResult<String> {
        self.git(path, args, self.config.command_timeout()).await
    }

    async fn status(&self, path: &Path) -> GitResult<RepositoryStatus> {
        let raw = self.local(path, &["status", "--porcelain"]).await?;
        Ok(status_parser::parse(&raw))
    }

    /// `branch --show-current`, then `rev-parse --abbrev-ref HEAD`, then
    /// [`DEFAULT_BRANCH`].
    async fn current_branch(&self, path: &Path) -> GitResult<String> {
        let branch = self.local(path, &["branch", "--show-current"]).await?;
        let branch = branch.trim();
        if !branch.is_empty() {
            return Ok(branch.to_string());
        }

        let fallback = self
            .local(path, &["rev-parse", "--abbrev-ref", "HEAD"])
            .await?;
        let fallback = fallback.trim();
        Ok(if fallback.is_empty() {
            DEFAULT_BRANCH.to_string()
        } else {
            fallback.to_string()
        })
    }

    async fn remote_url(&self, path: &Path) -> GitResult<Option<String>> {
        match self.local(path, &["remote", "get-url", "origin"]).await {
            Ok(out) => {
                let url = out.trim();
                Ok((!url.is_empty()).then(|| url.to_string()))
            }
            Err(e) if e.output_contains(NO_REMOTE_PATTERNS) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn worktrees(&self, path: &Path) -> GitResult<Vec<Worktree>> {
        let raw = self.local(path, &["worktree", "list", "--porcelain"]).await?;
        Ok(parse_worktrees(&raw))
    }

    async fn commit_difference(&self, path: &Path) -> GitResult<CommitDifference> {
        match self
            .local(
                path,
                &["rev-list", "--left-right", "--count", "HEAD...@{upstream}"],
            )
            .await
        {
            Ok(out) => Ok(parse_commit_difference(&out)),
            Err(e) if e.output_contains(NO_UPSTREAM_PATTERNS) => Ok(CommitDifference::default()),
            Err(e) => Err(e),
        }
    }
}

/// Parse `git worktree list --porcelain`.
///
/// Records are separated by blank lines and start with `worktree <path>`.
/// The first record is the main worktree.
pub fn parse_worktrees(raw: &str) -> Vec<Worktree> {
    let mut worktrees: Vec<Worktree> = Vec::new();

    for line in raw.lines() {
        let line = line.trim_end();

        if let Some(path) = line.strip_prefix("worktree ") {
            let is_main = worktrees.is_empty();
            worktrees.push(Worktree {
                path: PathBuf::from(path),
                branch: String::new(),
                commit: String::new(),
                is_main,
            });
            continue;
        }

        let Some(current) = worktrees.last_mut() else {
            continue;
        };

        if let Some(commit) = line.strip_prefix("HEAD ") {
            current.commit = commit.to_string();
        } else if let Some(branch) = line.strip_prefix("branch ") {
            current.branch = branch
                .strip_prefix("refs/heads/")
                .unwrap_or(branch)
                .to_string();
        } else if line == "detached" {
            current.branch = "(detached)".to_string();
        } else if line == "bare" {
            current.branch = "(bare)".to_string();
        }
    }

    worktrees
}

/// Parse `rev-list --left-right --count` output (`<ahead>\t<behind>`).
/// Anything unexpected counts as no divergence.
pub fn parse_commit_difference(raw: &str) -> CommitDifference {
    let mut counts = raw.split_whitespace().map(str::parse::<u32>);
    match (counts.next(), counts.next()) {
        (Some(Ok(ahead)), Some(Ok(behind))) => CommitDifference::new(ahead, behind),
        _ => CommitDifference::default(),
    }
}
