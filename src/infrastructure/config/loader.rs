//! Layered configuration loading and validation.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::config::{
    Config, MAX_REFRESH_INTERVAL_SECS, MIN_REFRESH_INTERVAL_SECS,
};

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Refresh interval outside the accepted bounds.
    #[error(
        "Invalid refresh_interval_secs: {0}. Must be between {MIN_REFRESH_INTERVAL_SECS} and {MAX_REFRESH_INTERVAL_SECS}"
    )]
    InvalidRefreshInterval(u64),

    /// A git timeout of zero.
    #[error("Invalid {name}: {value}. Must be at least 1 second")]
    InvalidTimeout {
        /// Setting name
        name: &'static str,
        /// Rejected value
        value: u64,
    },

    /// `git.executable` is blank.
    #[error("Git executable cannot be empty")]
    EmptyGitExecutable,

    /// Unknown `logging.level`.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown `logging.format`.
    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `<config dir>/repolens/config.yaml` (per-user settings, optional)
    /// 3. Environment variables (REPOLENS_* prefix, `__` separates nesting)
    pub fn load() -> Result<Config> {
        Self::extract(Self::figment(None))
    }

    /// Like [`ConfigLoader::load`], with an explicit file merged above the
    /// per-user file and below the environment.
    pub fn load_with_override(path: impl AsRef<Path>) -> Result<Config> {
        Self::extract(Self::figment(Some(path.as_ref())))
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Location of the per-user configuration file.
    pub fn user_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("repolens").join("config.yaml"))
    }

    fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(user_file) = Self::user_config_file() {
            figment = figment.merge(Yaml::file(user_file));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Yaml::file(path));
        }

        figment.merge(Env::prefixed("REPOLENS_").split("__"))
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let interval = config.monitor.refresh_interval_secs;
        if !(MIN_REFRESH_INTERVAL_SECS..=MAX_REFRESH_INTERVAL_SECS).contains(&interval) {
            return Err(ConfigError::InvalidRefreshInterval(interval));
        }

        if config.git.executable.trim().is_empty() {
            return Err(ConfigError::EmptyGitExecutable);
        }

        for (name, value) in [
            ("command_timeout_secs", config.git.command_timeout_secs),
            ("fetch_timeout_secs", config.git.fetch_timeout_secs),
            ("pull_timeout_secs", config.git.pull_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidTimeout { name, value });
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
