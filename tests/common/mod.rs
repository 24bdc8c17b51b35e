//! Common test utilities for integration tests
//!
//! Helpers for building real Git repositories in temporary directories.
//! Tests that need the `git` executable call [`git_available`] first and
//! return early when it is missing.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Whether a `git` executable is on the PATH.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run git in `dir`, panicking with its stderr on failure.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run git {args:?}: {e}"));
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Initialize a repository at `path` on branch `main` with one commit.
#[allow(dead_code)]
pub fn init_git_repo(path: &Path) {
    std::fs::create_dir_all(path).expect("Failed to create repo dir");
    git(path, &["init", "--quiet"]);
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(path, &["config", "user.email", "test@test.com"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "commit.gpgsign", "false"]);
    std::fs::write(path.join("README.md"), "hello\n").expect("Failed to write README");
    git(path, &["add", "README.md"]);
    git(path, &["commit", "--quiet", "-m", "initial commit"]);
}

/// Temp dir holding an initialized repository named `repo`.
#[allow(dead_code)]
pub fn setup_test_git_repo() -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join("repo");
    init_git_repo(&path);
    (dir, path)
}

/// Temp dir holding a bare `origin` and a clone `work` tracking it.
#[allow(dead_code)]
pub fn setup_repo_with_remote() -> (TempDir, PathBuf, PathBuf) {
    let (dir, seed) = setup_test_git_repo();
    let origin = dir.path().join("origin.git");
    let work = dir.path().join("work");

    git(
        dir.path(),
        &["clone", "--quiet", "--bare", path_str(&seed), path_str(&origin)],
    );
    git(dir.path(), &["clone", "--quiet", path_str(&origin), path_str(&work)]);
    git(&work, &["config", "user.email", "test@test.com"]);
    git(&work, &["config", "user.name", "Test User"]);
    git(&work, &["config", "commit.gpgsign", "false"]);

    (dir, origin, work)
}

/// Poll `predicate` every 50ms until it holds or `timeout_ms` passes.
#[allow(dead_code)]
pub async fn wait_for<F>(mut predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if predicate() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    false
}

#[allow(dead_code)]
pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}
