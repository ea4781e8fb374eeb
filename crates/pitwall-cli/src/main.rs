//! Pitwall CLI - Command line interface for pit-stop strategy planning
//!
//! Loads FastF1 lap exports, trains the Q-learning planner on a driver's race
//! and prints the recommended stop/stay sequence.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::float_cmp)]
#![allow(clippy::needless_pass_by_value)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{config as config_cmd, drivers, evaluate, simulate, summary};

#[derive(Parser)]
#[command(name = "pitwall")]
#[command(author, version, about = "Pitwall - pit-stop strategy planner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (overrides PITWALL_CONFIG and the default locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on a driver's race and print the recommended strategy
    Simulate(simulate::SimulateArgs),

    /// Replay a hand-written stop/stay sequence through the race model
    Evaluate(evaluate::EvaluateArgs),

    /// Summarise a driver's race from the lap data
    Summary(summary::SummaryArgs),

    /// List drivers present in a lap file
    Drivers(drivers::DriversArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("pitwall_cli={log_level},pitwall_rl={log_level},pitwall_core={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Simulate(args) => simulate::run(args, &config::Config::load(config_path)?),
        Commands::Evaluate(args) => evaluate::run(args, &config::Config::load(config_path)?),
        Commands::Summary(args) => summary::run(args, &config::Config::load(config_path)?),
        Commands::Drivers(args) => drivers::run(args, &config::Config::load(config_path)?),
        Commands::Config(cmd) => config_cmd::run(cmd, config_path),
    }
}
