//! Driver listing command

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use pitwall_core::list_drivers;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct DriversArgs {
    /// Lap CSV exported from FastF1
    #[arg(short, long)]
    laps: PathBuf,
}

pub fn run(args: DriversArgs, config: &Config) -> Result<()> {
    let drivers = list_drivers(&args.laps, &config.ingest)
        .with_context(|| format!("Failed to read lap data from {}", args.laps.display()))?;

    if drivers.is_empty() {
        println!("No driver column in {}", args.laps.display());
        return Ok(());
    }

    println!("Drivers ({})", drivers.len());
    println!("===========");
    for driver in drivers {
        println!("  {driver}");
    }

    Ok(())
}
