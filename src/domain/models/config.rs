//! Configuration model with serde defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for repolens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Periodic refresh configuration
    #[serde(default)]
    pub monitor: MonitorSettings,

    /// Git executable and command timeouts
    #[serde(default)]
    pub git: GitConfig,

    /// Where the tracked repository list is persisted
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Monitor settings as read from user configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonitorSettings {
    /// Seconds between fast refresh cycles (10-300)
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Whether change notifications are delivered
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

/// Shortest accepted refresh interval, in seconds.
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 10;
/// Longest accepted refresh interval, in seconds.
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 300;

const fn default_refresh_interval_secs() -> u64 {
    10
}

const fn default_true() -> bool {
    true
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            notifications_enabled: true,
        }
    }
}

impl MonitorSettings {
    /// Interval between fast refresh cycles.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

/// Git invocation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GitConfig {
    /// Executable name or path
    #[serde(default = "default_git_executable")]
    pub executable: String,

    /// Timeout for local commands (status, branch, worktree list, ...)
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Timeout for `git fetch`
    #[serde(default = "default_network_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Timeout for `git pull`
    #[serde(default = "default_network_timeout_secs")]
    pub pull_timeout_secs: u64,
}

fn default_git_executable() -> String {
    "git".to_string()
}

const fn default_command_timeout_secs() -> u64 {
    30
}

const fn default_network_timeout_secs() -> u64 {
    60
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            executable: default_git_executable(),
            command_timeout_secs: default_command_timeout_secs(),
            fetch_timeout_secs: default_network_timeout_secs(),
            pull_timeout_secs: default_network_timeout_secs(),
        }
    }
}

impl GitConfig {
    /// Deadline for local git queries.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Deadline for `git fetch`.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Deadline for `git pull`.
    pub fn pull_timeout(&self) -> Duration {
        Duration::from_secs(self.pull_timeout_secs)
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    /// Override for the repositories file. Defaults to
    /// `<data dir>/repolens/repositories.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the repositories file location.
    pub fn repositories_file(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_repositories_file)
    }
}

fn default_repositories_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("repolens")
        .join("repositories.json")
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Debug logging switch, overrides `level` with `debug` when set
    #[serde(default)]
    pub debug: bool,

    /// Directory for rolling JSON log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            debug: false,
            log_dir: None,
        }
    }
}

impl LoggingConfig {
    /// Level actually applied, taking the debug switch into account.
    pub fn effective_level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.level
        }
    }
}
