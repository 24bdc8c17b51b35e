//! repolens CLI entry point.

use anyhow::Context;
use clap::Parser;

use repolens::cli::{commands, handle_error, load_config, Cli, Commands};
use repolens::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()).context("Failed to load configuration") {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Repo(args) => commands::repo::execute(args, &config, cli.json).await,
        Commands::Status => commands::status::execute(&config, cli.json).await,
        Commands::Watch(args) => commands::watch::execute(args, &config, cli.json).await,
        Commands::Config => commands::config::execute(&config, cli.json),
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
