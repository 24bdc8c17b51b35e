//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::repo::RepoArgs;
use crate::cli::commands::watch::WatchArgs;

/// Top-level command line.
#[derive(Parser, Debug)]
#[command(name = "repolens")]
#[command(about = "repolens - live status of your local Git repositories", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Additional configuration file (YAML), merged above the user config
    #[arg(short, long, global = true, env = "REPOLENS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage tracked repositories
    Repo(RepoArgs),

    /// Summary of every tracked repository
    Status,

    /// Run the monitor in the foreground and print changes
    Watch(WatchArgs),

    /// Print the effective configuration
    Config,
}
