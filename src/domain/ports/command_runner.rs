//! Command runner port.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::domain::errors::GitResult;

/// Runs an external command in a directory with a deadline.
///
/// Implementations must return [`GitError::Timeout`] once `timeout` elapses
/// and make sure the process is gone by then. A non-zero exit maps to
/// [`GitError::CommandFailed`] carrying stderr, or stdout when stderr is
/// empty.
///
/// [`GitError::Timeout`]: crate::domain::errors::GitError::Timeout
/// [`GitError::CommandFailed`]: crate::domain::errors::GitError::CommandFailed
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program args...` in `working_dir` and return its stdout.
    async fn execute(
        &self,
        program: &str,
        args: &[&str],
        working_dir: &Path,
        timeout: Duration,
    ) -> GitResult<String>;
}

/// Render a command the way it would be typed in a shell, for errors and logs.
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
