//! CLI interface for cadence.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

pub mod analyze;
pub mod config;
pub mod fetch;
mod formatting;
pub mod webhook;

/// cadence: scores git commits for signs of automated generation.
#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Scores git commits for signs of automated or AI-generated code", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Analyzes a repository's commit history.
    Analyze(analyze::AnalyzeCommand),
    /// Configuration file management.
    Config(config::ConfigCommand),
    /// Fetches a web page and prints its readable text.
    Fetch(fetch::FetchCommand),
    /// Runs the GitHub push webhook server.
    Webhook(webhook::WebhookCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Analyze(analyze_cmd) => analyze_cmd.execute(),
            Commands::Config(config_cmd) => config_cmd.execute(),
            Commands::Fetch(fetch_cmd) => {
                let rt =
                    tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
                rt.block_on(fetch_cmd.execute())
            }
            Commands::Webhook(webhook_cmd) => {
                let rt =
                    tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
                rt.block_on(webhook_cmd.execute())
            }
        }
    }
}
