//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    describe::DescribeArgs, init::InitArgs, request::RequestArgs, run::RunArgs, usage::UsageArgs,
};

#[derive(Parser, Debug)]
#[command(name = "index-patterns")]
#[command(about = "Index patterns service on an in-memory host platform", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .index-patterns/config.yaml merged with local.yaml)
    #[arg(short, long, global = true, env = "INDEX_PATTERNS_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init(InitArgs),

    /// Show what the capability registered with the platform
    Describe(DescribeArgs),

    /// Send one request to the index patterns HTTP API
    Request(RequestArgs),

    /// Replay a file of requests against one platform instance
    Run(RunArgs),

    /// Collect usage telemetry
    Usage(UsageArgs),
}
