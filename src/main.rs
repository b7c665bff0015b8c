//! index-patterns CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::Path;

use index_patterns::cli::{commands, Cli, Commands};
use index_patterns::domain::models::Config;
use index_patterns::infrastructure::config::ConfigLoader;
use index_patterns::infrastructure::logging::LoggerImpl;

/// Load configuration and install logging; the logger guard must outlive the command
fn boot(config_path: Option<&Path>) -> Result<(Config, LoggerImpl)> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let logger = LoggerImpl::init(&config.logging)?;
    Ok((config, logger))
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Init(args) => commands::init::execute(args, cli.json).await,
        Commands::Describe(args) => {
            let (config, _logger) = boot(config_path)?;
            commands::describe::execute(args, &config, cli.json).await
        }
        Commands::Request(args) => {
            let (config, _logger) = boot(config_path)?;
            commands::request::execute(args, &config, cli.json).await
        }
        Commands::Run(args) => {
            let (config, _logger) = boot(config_path)?;
            commands::run::execute(args, &config, cli.json).await
        }
        Commands::Usage(args) => {
            let (config, _logger) = boot(config_path)?;
            commands::usage::execute(args, &config, cli.json).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        index_patterns::cli::handle_error(err, json);
    }
}
