//! Repository CLI commands.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::engine_context;
use crate::cli::id_resolver::resolve_repository;
use crate::cli::open_engine;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{Config, Repository};
use crate::services::StatusEngine;

/// Arguments for `repolens repo`.
#[derive(Args, Debug)]
pub struct RepoArgs {
    /// Repository subcommand to run
    #[command(subcommand)]
    pub command: RepoCommands,
}

/// Repository management subcommands.
#[derive(Subcommand, Debug)]
pub enum RepoCommands {
    /// Start tracking a repository
    Add {
        /// Path to the repository (working directory or linked worktree)
        path: PathBuf,
    },
    /// Stop tracking a repository
    Remove {
        /// Id, id prefix, name or path
        repo: String,
    },
    /// List tracked repositories
    List,
    /// Show repository details
    Show {
        /// Id, id prefix, name or path
        repo: String,
    },
    /// Refresh one repository, or all of them
    Refresh {
        /// Id, id prefix, name or path (all repositories when omitted)
        repo: Option<String>,
        /// Also fetch from the remote and recount ahead/behind
        #[arg(short, long)]
        fetch: bool,
    },
    /// Fast-forward pull
    Pull {
        /// Id, id prefix, name or path
        repo: String,
    },
    /// Stop tracking every repository
    Clear {
        /// Confirm removal of all repositories
        #[arg(long)]
        yes: bool,
    },
}

/// Result of `repo list`.
#[derive(Debug, Serialize)]
pub struct RepositoryListOutput {
    /// Tracked repositories in display order
    pub repositories: Vec<Repository>,
    /// Number of tracked repositories
    pub total: usize,
}

impl CommandOutput for RepositoryListOutput {
    fn to_human(&self) -> String {
        if self.repositories.is_empty() {
            return "No repositories tracked. Add one with 'repolens repo add <path>'.".to_string();
        }

        format!(
            "Tracking {} repositor{}:\n{}",
            self.total,
            if self.total == 1 { "y" } else { "ies" },
            TableFormatter::new().format_repositories(&self.repositories)
        )
    }
}

/// Result of `repo show`.
#[derive(Debug, Serialize)]
pub struct RepositoryDetailOutput {
    /// Repository as currently known
    pub repository: Repository,
    /// Browsable URL of the origin remote, when derivable
    pub web_url: Option<String>,
}

impl CommandOutput for RepositoryDetailOutput {
    fn to_human(&self) -> String {
        let repo = &self.repository;
        let mut lines = vec![
            format!("Repository: {}", repo.name),
            format!("ID: {}", repo.id),
            format!("Path: {}", repo.path.display()),
            format!("Branch: {}", repo.current_branch.as_deref().unwrap_or("-")),
        ];

        if let Some(ref url) = self.web_url {
            lines.push(format!("Remote: {url}"));
        }
        if let (Some(ahead), Some(behind)) = (repo.commits_ahead, repo.commits_behind) {
            lines.push(format!("Ahead: {ahead}  Behind: {behind}"));
        }
        if repo.is_worktree == Some(true) {
            if let Some(ref main) = repo.main_worktree_path {
                lines.push(format!("Linked worktree of: {}", main.display()));
            }
        }
        if let Some(fetched) = repo.last_fetched_at {
            lines.push(format!("Last refreshed: {}", fetched.to_rfc3339()));
        }

        match &repo.git_status {
            None => lines.push("Status: not refreshed yet".to_string()),
            Some(status) if status.is_clean() => lines.push("Status: clean".to_string()),
            Some(status) => {
                lines.push(format!("Status: {} changed file(s)", status.total_changed_files()));
                for (label, files) in [
                    ("Staged", &status.staged_files),
                    ("Modified", &status.modified_files),
                    ("Untracked", &status.untracked_files),
                ] {
                    if !files.is_empty() {
                        lines.push(format!("  {label}:"));
                        lines.extend(files.iter().map(|f| format!("    {f}")));
                    }
                }
            }
        }

        if let Some(ref worktrees) = repo.worktrees {
            if worktrees.len() > 1 {
                lines.push(String::new());
                lines.push(TableFormatter::new().format_worktrees(worktrees));
            }
        }

        lines.join("\n")
    }
}

/// Outcome of a mutating repository command.
#[derive(Debug, Serialize)]
pub struct RepoActionOutput {
    /// Whether every requested action succeeded
    pub success: bool,
    /// Message for humans
    pub message: String,
    /// Repository the action touched, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,
}

impl CommandOutput for RepoActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

/// Run a `repo` subcommand against the persisted collection.
pub async fn execute(args: RepoArgs, config: &Config, json_mode: bool) -> Result<()> {
    let engine = open_engine(config).await;

    match args.command {
        RepoCommands::Add { path } => {
            let repository = engine_context(
                engine.add_repository(&path).await,
                "add repository",
            )?;
            // Fill in the status now; the process may exit before the
            // background refresh gets to run.
            let collection = engine.collection();
            if let Err(e) = collection.update_one(repository.id, false).await {
                tracing::warn!(error = %e, "initial refresh failed");
            }
            collection.save().await;

            let repository = collection.get(repository.id).await.unwrap_or(repository);
            let out = RepoActionOutput {
                success: true,
                message: format!(
                    "Tracking {} at {}",
                    repository.name,
                    repository.path.display()
                ),
                repository: Some(repository),
            };
            output(&out, json_mode);
        }

        RepoCommands::Remove { repo } => {
            let repository = resolve(&engine, &repo).await?;
            engine.remove_repository(repository.id).await;

            let out = RepoActionOutput {
                success: true,
                message: format!("Stopped tracking {}", repository.name),
                repository: Some(repository),
            };
            output(&out, json_mode);
        }

        RepoCommands::List => {
            let repositories = engine.list_repositories().await;
            let out = RepositoryListOutput {
                total: repositories.len(),
                repositories,
            };
            output(&out, json_mode);
        }

        RepoCommands::Show { repo } => {
            let repository = resolve(&engine, &repo).await?;
            let out = RepositoryDetailOutput {
                web_url: repository.web_url(),
                repository,
            };
            output(&out, json_mode);
        }

        RepoCommands::Refresh { repo, fetch } => {
            let collection = engine.collection();
            let targets: Vec<Repository> = match repo {
                Some(query) => vec![resolve(&engine, &query).await?],
                None => engine.list_repositories().await,
            };

            let mut failed = Vec::new();
            for target in &targets {
                let mut result = collection.update_one(target.id, false).await;
                if result.is_ok() && fetch {
                    result = collection.refresh_remote(target.id).await;
                }
                if let Err(e) = result {
                    failed.push(format!("{}: {e}", target.name));
                }
            }
            collection.save().await;

            let out = RepoActionOutput {
                success: failed.is_empty(),
                message: if failed.is_empty() {
                    format!("Refreshed {} repositor(ies)", targets.len())
                } else {
                    format!(
                        "Refreshed {} of {} repositor(ies). Failures:\n  {}",
                        targets.len() - failed.len(),
                        targets.len(),
                        failed.join("\n  ")
                    )
                },
                repository: None,
            };
            output(&out, json_mode);
        }

        RepoCommands::Pull { repo } => {
            let repository = resolve(&engine, &repo).await?;
            let result = engine_context(
                engine.pull(repository.id).await,
                &format!("pull {}", repository.name),
            )?;
            engine.collection().save().await;

            let out = RepoActionOutput {
                success: true,
                message: if result.is_empty() {
                    format!("Pulled {}", repository.name)
                } else {
                    result
                },
                repository: engine.collection().get(repository.id).await,
            };
            output(&out, json_mode);
        }

        RepoCommands::Clear { yes } => {
            if !yes {
                bail!("Refusing to remove every repository without --yes");
            }
            let count = engine.collection().len().await;
            engine.collection().clear_all().await;

            let out = RepoActionOutput {
                success: true,
                message: format!("Removed {count} repositor(ies)"),
                repository: None,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}

async fn resolve(engine: &StatusEngine, query: &str) -> Result<Repository> {
    let repositories = engine.list_repositories().await;
    let id = resolve_repository(&repositories, query)?;
    match repositories.into_iter().find(|r| r.id == id) {
        Some(repository) => Ok(repository),
        None => bail!("No repository matches '{query}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RepositoryStatus;

    #[test]
    fn test_empty_list_hint() {
        let out = RepositoryListOutput {
            repositories: vec![],
            total: 0,
        };
        assert!(out.to_human().contains("repolens repo add"));
    }

    #[test]
    fn test_detail_lists_changed_files() {
        let mut repo = Repository::new("/work/app");
        repo.current_branch = Some("main".to_string());
        repo.git_status = Some(RepositoryStatus::new(
            vec!["a.rs".to_string()],
            vec![],
            vec!["notes.txt".to_string()],
        ));
        repo.commits_ahead = Some(1);
        repo.commits_behind = Some(0);

        let human = RepositoryDetailOutput {
            web_url: None,
            repository: repo,
        }
        .to_human();

        assert!(human.contains("Branch: main"));
        assert!(human.contains("Status: 2 changed file(s)"));
        assert!(human.contains("    a.rs"));
        assert!(human.contains("    notes.txt"));
        assert!(human.contains("Ahead: 1  Behind: 0"));
    }

    #[test]
    fn test_action_output_json_omits_missing_repository() {
        let out = RepoActionOutput {
            success: true,
            message: "done".to_string(),
            repository: None,
        };
        let json = out.to_json();
        assert_eq!(json["success"], true);
        assert!(json.get("repository").is_none());
    }
}
