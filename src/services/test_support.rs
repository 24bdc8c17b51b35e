//! Scripted doubles shared by the service unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::errors::{GitError, GitResult};
use crate::domain::ports::{command_line, CommandRunner, Notifier};

/// Canned outcome for one git invocation.
#[derive(Debug, Clone)]
pub enum Reply {
    Out(String),
    Fail { output: String, exit_code: i32 },
    Timeout,
}

impl Reply {
    pub fn out(s: &str) -> Self {
        Self::Out(s.to_string())
    }

    pub fn fail(output: &str) -> Self {
        Self::Fail {
            output: output.to_string(),
            exit_code: 128,
        }
    }
}

/// Command runner answering from a table keyed by the argument string
/// (`"status --porcelain"`). Unknown commands succeed with empty output.
/// A per-directory table takes precedence over the shared one.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    replies: Mutex<HashMap<String, Reply>>,
    per_dir: Mutex<HashMap<(PathBuf, String), Reply>>,
    calls: Mutex<Vec<(PathBuf, String)>>,
    delay: Option<Duration>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn reply(self, args: &str, reply: Reply) -> Self {
        self.set(args, reply);
        self
    }

    /// Replace the reply for `args` while the runner is in use.
    pub fn set(&self, args: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(args.to_string(), reply);
    }

    pub fn set_for(&self, dir: &Path, args: &str, reply: Reply) {
        self.per_dir
            .lock()
            .unwrap()
            .insert((dir.to_path_buf(), args.to_string()), reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn count(&self, args: &str) -> usize {
        self.calls().iter().filter(|c| *c == args).count()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn execute(
        &self,
        program: &str,
        args: &[&str],
        working_dir: &Path,
        _timeout: Duration,
    ) -> GitResult<String> {
        let key = args.join(" ");
        self.calls
            .lock()
            .unwrap()
            .push((working_dir.to_path_buf(), key.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .per_dir
            .lock()
            .unwrap()
            .get(&(working_dir.to_path_buf(), key.clone()))
            .cloned()
            .or_else(|| self.replies.lock().unwrap().get(&key).cloned())
            .unwrap_or(Reply::Out(String::new()));

        let command = command_line(program, args);
        match reply {
            Reply::Out(out) => Ok(out),
            Reply::Fail { output, exit_code } => Err(GitError::CommandFailed {
                command,
                output,
                exit_code,
            }),
            Reply::Timeout => Err(GitError::Timeout { command }),
        }
    }
}

/// Notifier that records every call.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, body: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }
}

/// Create `<parent>/<name>/.git` and return the repository directory.
pub fn fake_repo(parent: &Path, name: &str) -> PathBuf {
    let repo = parent.join(name);
    std::fs::create_dir_all(repo.join(".git")).unwrap();
    repo
}
