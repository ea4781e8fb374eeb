//! Configuration management commands

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::Path;

use crate::config::Config;

const DEFAULT_CONFIG: &str = include_str!("../../../../pitwall.toml.example");

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show,
    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run(cmd: ConfigCommands, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(config_path),
        ConfigCommands::Init { force } => init(config_path.unwrap_or(Path::new("pitwall.toml")), force),
    }
}

fn show(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;

    println!("# Resolved configuration (defaults, file, PITWALL__* environment)");
    println!("{rendered}");

    Ok(())
}

fn init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        println!("Configuration file already exists: {}", config_path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Configuration file created: {}", config_path.display());

    Ok(())
}
