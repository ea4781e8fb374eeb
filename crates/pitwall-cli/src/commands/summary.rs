//! Race summary command

use anyhow::Result;
use clap::Args;

use pitwall_core::DriverSummary;

use super::LapSource;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    source: LapSource,

    /// Print summaries as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: SummaryArgs, config: &Config) -> Result<()> {
    let summaries: Vec<DriverSummary> = if args.source.driver.is_some() {
        vec![DriverSummary::from_laps(&args.source.driver_laps(&config.ingest)?)]
    } else {
        args.source
            .table(&config.ingest)?
            .all_drivers()?
            .iter()
            .map(DriverSummary::from_laps)
            .collect()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        print_summary(summary);
    }

    Ok(())
}

fn print_summary(summary: &DriverSummary) {
    println!("Driver {}", summary.driver.as_deref().unwrap_or("-"));
    println!("  Laps completed: {}", summary.laps_completed);
    println!("  Timed laps:     {}", summary.timed_laps);
    match summary.avg_lap_time {
        Some(avg) => println!("  Avg lap time:   {avg:.3}s"),
        None => println!("  Avg lap time:   -"),
    }
    println!("  Pit stops:      {}", summary.total_pit_stops);
    println!("  Stints:         {}", summary.num_stints);
    println!(
        "  Main compound:  {}",
        summary.main_compound.as_ref().map_or("-", |c| c.as_str())
    );
    println!();
}
