//! Process management
//!
//! Runs the `git` executable as a child process with a deadline.

pub mod git_runner;

pub use git_runner::ProcessCommandRunner;
