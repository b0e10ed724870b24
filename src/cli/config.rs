//! Configuration-related CLI commands.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{generate_sample_config, Config};

/// Default file written by `cadence config init`.
pub const DEFAULT_CONFIG_FILE: &str = "cadence.yaml";

/// Configuration operations.
#[derive(Parser)]
pub struct ConfigCommand {
    /// Configuration subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Writes a sample configuration file.
    Init(InitCommand),
    /// Prints the effective configuration as YAML.
    Show(ShowCommand),
}

/// Init command options.
#[derive(Parser)]
pub struct InitCommand {
    /// Destination file.
    #[arg(value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub path: PathBuf,

    /// Overwrites an existing file.
    #[arg(long)]
    pub force: bool,
}

/// Show command options.
#[derive(Parser)]
pub struct ShowCommand {
    /// Configuration file to merge over the defaults.
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ConfigCommand {
    /// Executes the config command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            ConfigSubcommands::Init(init_cmd) => init_cmd.execute(),
            ConfigSubcommands::Show(show_cmd) => show_cmd.execute(),
        }
    }
}

impl InitCommand {
    /// Executes the init command.
    pub fn execute(self) -> Result<()> {
        if self.path.exists() && !self.force {
            bail!(
                "{} already exists (use --force to overwrite)",
                self.path.display()
            );
        }
        generate_sample_config(&self.path)?;
        println!("\u{2705} Wrote sample configuration to {}", self.path.display());
        Ok(())
    }
}

impl ShowCommand {
    /// Executes the show command.
    pub fn execute(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
        print!("{yaml}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cadence.yaml");
        std::fs::write(&path, "keep: me\n").unwrap();

        let err = InitCommand {
            path: path.clone(),
            force: false,
        }
        .execute()
        .unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep: me\n");

        InitCommand {
            path: path.clone(),
            force: true,
        }
        .execute()
        .unwrap();
        let written: Config = serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, Config::default());
    }
}
