//! Process-backed command runner.
//!
//! Spawns the external command with `tokio::process`, races it against the
//! deadline and tears the whole process group down when the deadline wins.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::domain::errors::{GitError, GitResult};
use crate::domain::ports::{command_line, CommandRunner};
use crate::infrastructure::logging::scrub_credentials;

/// Runs commands as child processes of the current process.
///
/// Every child gets `GIT_TERMINAL_PROMPT=0` so credential prompts fail
/// instead of blocking, and `LC_ALL=C` so error messages can be matched.
#[derive(Debug, Clone)]
pub struct ProcessCommandRunner {
    env: Vec<(String, String)>,
}

impl ProcessCommandRunner {
    /// Runner with the non-interactive git environment.
    pub fn new() -> Self {
        Self {
            env: vec![
                ("GIT_TERMINAL_PROMPT".to_string(), "0".to_string()),
                ("LC_ALL".to_string(), "C".to_string()),
            ],
        }
    }
}

impl Default for ProcessCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn execute(
        &self,
        program: &str,
        args: &[&str],
        working_dir: &Path,
        timeout: Duration,
    ) -> GitResult<String> {
        let command = command_line(program, args);
        let started = Instant::now();

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(working_dir)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so helpers git spawns (ssh, credential helpers)
        // go down with it on timeout.
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd
            .spawn()
            .map_err(|e| classify_spawn_error(e, &command, working_dir))?;

        let outcome = tokio::time::timeout(timeout, collect_output(&mut child)).await;

        match outcome {
            Ok(Ok((status, stdout, stderr))) => {
                debug!(
                    command = %command,
                    working_dir = %working_dir.display(),
                    exit_code = ?status.code(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "command finished"
                );
                into_result(command, status, &stdout, &stderr)
            }
            Ok(Err(source)) => {
                terminate(&mut child).await;
                Err(GitError::Io { command, source })
            }
            Err(_) => {
                warn!(
                    command = %command,
                    working_dir = %working_dir.display(),
                    timeout_ms = timeout.as_millis() as u64,
                    "command timed out, killing process group"
                );
                terminate(&mut child).await;
                Err(GitError::Timeout { command })
            }
        }
    }
}

/// Wait for exit while draining both pipes, so a chatty child cannot block
/// on a full pipe buffer.
async fn collect_output(child: &mut Child) -> io::Result<(ExitStatus, Vec<u8>, Vec<u8>)> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (status, stdout, stderr) =
        tokio::try_join!(child.wait(), read_all(stdout), read_all(stderr))?;

    Ok((status, stdout, stderr))
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

fn into_result(
    command: String,
    status: ExitStatus,
    stdout: &[u8],
    stderr: &[u8],
) -> GitResult<String> {
    let stdout = String::from_utf8_lossy(stdout).into_owned();

    if status.success() {
        return Ok(stdout);
    }

    let stderr = String::from_utf8_lossy(stderr);
    let output = if stderr.trim().is_empty() {
        stdout
    } else {
        stderr.into_owned()
    };

    debug!(
        command = %command,
        output = %scrub_credentials(output.trim()),
        "command exited unsuccessfully"
    );

    Err(GitError::CommandFailed {
        command,
        output,
        exit_code: status.code().unwrap_or(-1),
    })
}

/// Kill the child (and its process group on Unix) and reap it.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id().and_then(|pid| i32::try_from(pid).ok()) {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
            debug!(pid, error = %e, "failed to signal process group");
        }
    }

    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill timed out process");
    }
}

fn classify_spawn_error(err: io::Error, command: &str, working_dir: &Path) -> GitError {
    match err.kind() {
        io::ErrorKind::NotFound if !working_dir.is_dir() => {
            GitError::InvalidPath(working_dir.to_path_buf())
        }
        io::ErrorKind::NotFound => GitError::GitNotFound,
        io::ErrorKind::PermissionDenied => GitError::PermissionDenied {
            path: working_dir.to_path_buf(),
        },
        _ => GitError::Io {
            command: command.to_string(),
            source: err,
        },
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn runner() -> ProcessCommandRunner {
        ProcessCommandRunner::new()
    }

    fn tmp() -> std::path::PathBuf {
        std::env::temp_dir()
    }

    #[tokio::test]
    async fn test_success_returns_stdout() {
        let out = runner()
            .execute("sh", &["-c", "printf hello"], &tmp(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_failure_prefers_stderr() {
        let err = runner()
            .execute(
                "sh",
                &["-c", "echo out; echo boom >&2; exit 3"],
                &tmp(),
                Duration::from_secs(5),
            )
            .await
            .unwrap_err();

        match err {
            GitError::CommandFailed {
                output, exit_code, ..
            } => {
                assert_eq!(output.trim(), "boom");
                assert_eq!(exit_code, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_stdout() {
        let err = runner()
            .execute("sh", &["-c", "echo only-stdout; exit 1"], &tmp(), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GitError::CommandFailed { ref output, exit_code: 1, .. } if output.trim() == "only-stdout"
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_reported_promptly() {
        let started = Instant::now();
        let err = runner()
            .execute("sleep", &["5"], &tmp(), Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(matches!(err, GitError::Timeout { ref command } if command == "sleep 5"));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_timeout_kills_grandchildren() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("survived");
        let script = format!("(sleep 1; touch {}) & wait", marker.display());

        let err = runner()
            .execute("sh", &["-c", &script], dir.path(), Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::Timeout { .. }));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "background child outlived the timeout");
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let err = runner()
            .execute("definitely-not-a-real-binary-xyz", &[], &tmp(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::GitNotFound));
    }

    #[tokio::test]
    async fn test_missing_working_directory() {
        let err = runner()
            .execute("sh", &["-c", "true"], Path::new("/no/such/dir/here"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_git_environment_is_set() {
        let out = runner()
            .execute(
                "sh",
                &["-c", "printf \"$GIT_TERMINAL_PROMPT:$LC_ALL\""],
                &tmp(),
                Duration::from_secs(5),
            )
            .await
            .unwrap();
        assert_eq!(out, "0:C");
    }
}
