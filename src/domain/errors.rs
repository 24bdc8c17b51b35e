//! Domain errors for the repository status engine.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while talking to the `git` executable or validating a
/// repository path.
#[derive(Debug, Error)]
pub enum GitError {
    /// The command ran and exited non-zero.
    #[error("Git command '{command}' failed with exit code {exit_code}: {output}")]
    CommandFailed {
        /// Command line as run
        command: String,
        /// Stderr, or stdout when stderr was empty
        output: String,
        /// Exit code, -1 when killed by a signal
        exit_code: i32,
    },

    /// The directory holds no `.git` entry.
    #[error("Not a valid Git repository at: {}", path.display())]
    InvalidRepository {
        /// Directory that was checked
        path: PathBuf,
    },

    /// The command outlived its deadline and was killed.
    #[error("Git command timed out: {command}")]
    Timeout {
        /// Command line as run
        command: String,
    },

    /// The configured git executable could not be spawned.
    #[error("Git executable not found")]
    GitNotFound,

    /// The path does not exist or is not a directory.
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// The path exists but cannot be read.
    #[error("Permission denied accessing: {}", path.display())]
    PermissionDenied {
        /// Path that was refused
        path: PathBuf,
    },

    /// Spawning or reading from the child failed.
    #[error("I/O error running '{command}': {source}")]
    Io {
        /// Command line as run
        command: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl GitError {
    /// Short, user-facing hint explaining why the operation failed.
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::CommandFailed { output, .. } => {
                let output = output.trim();
                (!output.is_empty()).then(|| output.to_string())
            }
            Self::InvalidRepository { .. } => {
                Some("The specified directory does not contain a .git folder".to_string())
            }
            Self::Timeout { .. } => Some("The operation took too long to complete".to_string()),
            Self::GitNotFound => Some("Please ensure Git is installed and accessible".to_string()),
            Self::InvalidPath(_) => {
                Some("The specified path does not exist or is not accessible".to_string())
            }
            Self::PermissionDenied { .. } => {
                Some("Check file permissions for the repository".to_string())
            }
            Self::Io { source, .. } => Some(source.to_string()),
        }
    }

    /// Whether this is a `CommandFailed` whose output contains any of `needles`.
    pub fn output_contains(&self, needles: &[&str]) -> bool {
        match self {
            Self::CommandFailed { output, .. } => needles.iter().any(|n| output.contains(n)),
            _ => false,
        }
    }
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Errors surfaced by the repository collection to its callers.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The path could not be normalized or is not a directory.
    #[error("The specified path is invalid: {}", .0.display())]
    InvalidPath(PathBuf),

    /// The directory exists but is not a working tree.
    #[error("The specified path is not a Git repository: {}", .0.display())]
    NotAGitRepository(PathBuf),

    /// A repository with the same normalized path is tracked.
    #[error("This repository has already been added: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// No tracked repository has this id.
    #[error("Repository not found: {0}")]
    NotFound(Uuid),

    /// The path cannot be read.
    #[error("Permission denied accessing: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// A git command failed.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// Result alias for collection operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    /// Fold path validation failures into their collection-level variants.
    pub fn from_validation(err: GitError) -> Self {
        match err {
            GitError::InvalidPath(path) => Self::InvalidPath(path),
            GitError::InvalidRepository { path } => Self::NotAGitRepository(path),
            GitError::PermissionDenied { path } => Self::PermissionDenied(path),
            other => Self::Git(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_descriptions() {
        let err = GitError::CommandFailed {
            command: "git status".to_string(),
            output: "fatal: not a git repository".to_string(),
            exit_code: 128,
        };
        assert_eq!(
            err.to_string(),
            "Git command 'git status' failed with exit code 128: fatal: not a git repository"
        );

        let err = GitError::InvalidRepository {
            path: PathBuf::from("/path/to/repo"),
        };
        assert_eq!(err.to_string(), "Not a valid Git repository at: /path/to/repo");

        let err = GitError::Timeout {
            command: "git clone".to_string(),
        };
        assert_eq!(err.to_string(), "Git command timed out: git clone");

        assert_eq!(GitError::GitNotFound.to_string(), "Git executable not found");
        assert_eq!(
            GitError::InvalidPath(PathBuf::from("/invalid/path")).to_string(),
            "Invalid path: /invalid/path"
        );
        assert_eq!(
            GitError::PermissionDenied {
                path: PathBuf::from("/restricted/path")
            }
            .to_string(),
            "Permission denied accessing: /restricted/path"
        );
    }

    #[test]
    fn test_failure_reason() {
        let err = GitError::CommandFailed {
            command: "git push".to_string(),
            output: "Authentication failed\n".to_string(),
            exit_code: 1,
        };
        assert_eq!(err.failure_reason().as_deref(), Some("Authentication failed"));

        let err = GitError::CommandFailed {
            command: "git push".to_string(),
            output: String::new(),
            exit_code: 1,
        };
        assert!(err.failure_reason().is_none());

        let err = GitError::Timeout {
            command: "git fetch".to_string(),
        };
        assert_eq!(
            err.failure_reason().as_deref(),
            Some("The operation took too long to complete")
        );
    }

    #[test]
    fn test_output_contains_only_matches_command_failures() {
        let failed = GitError::CommandFailed {
            command: "git remote get-url origin".to_string(),
            output: "error: No such remote 'origin'".to_string(),
            exit_code: 2,
        };
        assert!(failed.output_contains(&["No such remote"]));
        assert!(!failed.output_contains(&["no upstream"]));

        let timeout = GitError::Timeout {
            command: "No such remote".to_string(),
        };
        assert!(!timeout.output_contains(&["No such remote"]));
    }

    #[test]
    fn test_from_validation_maps_variants() {
        let path = PathBuf::from("/tmp/x");
        assert!(matches!(
            RepositoryError::from_validation(GitError::InvalidPath(path.clone())),
            RepositoryError::InvalidPath(_)
        ));
        assert!(matches!(
            RepositoryError::from_validation(GitError::InvalidRepository { path: path.clone() }),
            RepositoryError::NotAGitRepository(_)
        ));
        assert!(matches!(
            RepositoryError::from_validation(GitError::PermissionDenied { path }),
            RepositoryError::PermissionDenied(_)
        ));
        assert!(matches!(
            RepositoryError::from_validation(GitError::GitNotFound),
            RepositoryError::Git(GitError::GitNotFound)
        ));
    }
}
