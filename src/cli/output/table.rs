//! Table output formatting for CLI commands
//!
//! Renders repositories and worktrees using comfy-table, with color-coded
//! cells when the terminal supports them.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::cli::output::truncate;
use crate::domain::models::{Repository, Worktree};

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
    max_width: Option<u16>,
}

impl TableFormatter {
    /// Formatter with colors when the terminal supports them.
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    /// Formatter with explicit color and width settings.
    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// One row per repository: name, branch, change counts, divergence.
    pub fn format_repositories(&self, repositories: &[Repository]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            header("ID"),
            header("Name"),
            header("Branch"),
            header("Staged"),
            header("Modified"),
            header("Untracked"),
            header("Ahead/Behind"),
            header("Path"),
        ]);

        for repository in repositories {
            let id_short = &repository.id.to_string()[..8];
            let branch = repository.current_branch.as_deref().unwrap_or("-");
            let (staged, modified, untracked) = match &repository.git_status {
                Some(s) => (
                    s.staged_files.len().to_string(),
                    s.modified_files.len().to_string(),
                    s.untracked_files.len().to_string(),
                ),
                None => ("-".to_string(), "-".to_string(), "-".to_string()),
            };
            let divergence = match (repository.commits_ahead, repository.commits_behind) {
                (Some(ahead), Some(behind)) => format!("↑{ahead} ↓{behind}"),
                _ => "-".to_string(),
            };

            let name = if repository.is_pulling {
                format!("{} (pulling)", repository.name)
            } else {
                repository.name.clone()
            };
            let name_cell = if self.use_colors && repository.has_changes() {
                Cell::new(name).fg(Color::Yellow)
            } else if self.use_colors {
                Cell::new(name).fg(Color::Green)
            } else {
                Cell::new(name)
            };

            table.add_row(vec![
                Cell::new(id_short),
                name_cell,
                Cell::new(truncate(branch, 24)),
                Cell::new(staged),
                Cell::new(modified),
                Cell::new(untracked),
                Cell::new(divergence),
                Cell::new(truncate(&repository.path.display().to_string(), 48)),
            ]);
        }

        table.to_string()
    }

    /// Render worktrees, marking the main one.
    pub fn format_worktrees(&self, worktrees: &[Worktree]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![header("Branch"), header("Commit"), header("Path")]);

        for worktree in worktrees {
            let branch = if worktree.is_main {
                format!("{} (main)", worktree.branch)
            } else {
                worktree.branch.clone()
            };
            let commit: String = worktree.commit.chars().take(8).collect();
            let branch_cell = if self.use_colors && worktree.is_main {
                Cell::new(branch).fg(Color::Cyan)
            } else {
                Cell::new(branch)
            };

            table.add_row(vec![
                branch_cell,
                Cell::new(commit),
                Cell::new(worktree.path.display().to_string()),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(title: &str) -> Cell {
    Cell::new(title).add_attribute(Attribute::Bold)
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RepositoryStatus;

    #[test]
    fn test_format_repositories() {
        let mut repo = Repository::new("/work/alpha");
        repo.current_branch = Some("main".to_string());
        repo.git_status = Some(RepositoryStatus::new(vec!["a".into()], vec![], vec![]));
        repo.commits_ahead = Some(1);
        repo.commits_behind = Some(0);
        let unseen = Repository::new("/work/beta");

        let out = TableFormatter::with_config(false, Some(160)).format_repositories(&[repo, unseen]);
        assert!(out.contains("alpha"));
        assert!(out.contains("beta"));
        assert!(out.contains("↑1 ↓0"));
        assert!(out.contains("Untracked"));
    }

    #[test]
    fn test_format_worktrees_marks_main() {
        let worktrees = vec![Worktree {
            path: "/work/alpha".into(),
            branch: "main".to_string(),
            commit: "0123456789abcdef".to_string(),
            is_main: true,
        }];
        let out = TableFormatter::with_config(false, Some(120)).format_worktrees(&worktrees);
        assert!(out.contains("main (main)"));
        assert!(out.contains("01234567"));
        assert!(!out.contains("0123456789"));
    }
}
