//! CLI command modules

pub mod config;
pub mod drivers;
pub mod evaluate;
pub mod simulate;
pub mod summary;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use pitwall_core::{DriverLaps, IngestConfig, LapTable};
use pitwall_rl::Rollout;

/// Lap file and driver selection shared by the race commands
#[derive(Args, Debug, Clone)]
pub struct LapSource {
    /// Lap CSV exported from FastF1
    #[arg(short, long)]
    pub laps: PathBuf,

    /// Driver number; may be omitted when the file holds a single driver
    #[arg(short, long)]
    pub driver: Option<String>,
}

impl LapSource {
    pub fn table(&self, ingest: &IngestConfig) -> Result<LapTable> {
        LapTable::from_path(&self.laps, ingest)
            .with_context(|| format!("Failed to read lap data from {}", self.laps.display()))
    }

    pub fn driver_laps(&self, ingest: &IngestConfig) -> Result<DriverLaps> {
        let laps = self
            .table(ingest)?
            .driver_laps(self.driver.as_deref())
            .with_context(|| format!("Failed to select driver laps from {}", self.laps.display()))?;
        tracing::debug!(
            "Loaded {} laps for driver {}",
            laps.len(),
            laps.driver().unwrap_or("-")
        );
        Ok(laps)
    }
}

/// Lap-by-lap strategy table followed by the stint breakdown
pub fn print_rollout(title: &str, laps: &DriverLaps, rollout: &Rollout) {
    println!("{title}");
    println!("{}", "=".repeat(title.len()));
    if let Some(driver) = laps.driver() {
        println!("Driver: {driver}");
    }
    println!();

    println!("{:>4}  {:<12}  {:>4}  {:<5}  {:>10}", "Lap", "Compound", "Age", "Call", "Lap time");
    for step in &rollout.steps {
        println!(
            "{:>4}  {:<12}  {:>4}  {:<5}  {:>9.3}s",
            step.state.lap,
            step.state.compound.as_str(),
            step.state.stint_age,
            step.action.to_string(),
            -step.reward
        );
    }

    println!();
    println!("Stints:");
    for stint in rollout.stints() {
        println!(
            "  {:<12} laps {}-{} ({} laps)",
            stint.compound.as_str(),
            stint.start_lap,
            stint.start_lap + stint.laps - 1,
            stint.laps
        );
    }

    let pit_laps = rollout.pit_laps();
    if pit_laps.is_empty() {
        println!("Pit stops: none");
    } else {
        let laps: Vec<String> = pit_laps.iter().map(ToString::to_string).collect();
        println!("Pit stops: {} (end of lap {})", pit_laps.len(), laps.join(", "));
    }
    println!("Total race time: {:.3}s", rollout.total_time);
}
