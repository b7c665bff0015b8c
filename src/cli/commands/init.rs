//! Implementation of the `index-patterns init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::setup::{create_config_dir, create_config_file, SetupPaths};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_file: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        format!("{}\n  {}", self.message, self.config_file.display())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let paths = SetupPaths::in_dir(&target_path);
    create_config_dir(&paths)?;
    let written = create_config_file(&paths, args.force)?;

    let message = match (written, args.force) {
        (false, _) => "Configuration already exists. Use --force to overwrite.",
        (true, true) => "Configuration rewritten.",
        (true, false) => "Configuration created.",
    };
    output(
        &InitOutput {
            success: written,
            message: message.to_string(),
            config_file: paths.config_file,
        },
        json_mode,
    );
    Ok(())
}
