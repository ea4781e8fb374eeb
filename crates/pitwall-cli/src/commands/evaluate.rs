//! Replay a fixed stop/stay sequence

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use pitwall_core::DriverLaps;
use pitwall_rl::{EnvironmentConfig, PitAction, RaceEnvironment, Rollout, StrategyStep};

use super::{print_rollout, LapSource};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[command(flatten)]
    source: LapSource,

    /// Comma-separated calls, one per lap (e.g. stay,stay,pit). Laps past the
    /// end of the list stay out.
    #[arg(short, long)]
    actions: String,

    /// Seed for the compound drawn at each stop
    #[arg(short, long)]
    seed: Option<u64>,

    /// Seconds lost on a pit stop
    #[arg(long)]
    pit_loss: Option<f64>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

/// Parse "stay,pit,..." into actions; blank entries are skipped
pub fn parse_actions(text: &str) -> Result<Vec<PitAction>> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.parse::<PitAction>().map_err(anyhow::Error::from))
        .collect()
}

/// Drive one race with the given calls
pub fn replay(
    laps: &DriverLaps,
    environment: EnvironmentConfig,
    seed: Option<u64>,
    actions: &[PitAction],
) -> Result<Rollout> {
    let mut env = RaceEnvironment::with_seed(laps, environment, seed)?;
    if actions.len() > env.total_laps() as usize {
        warn!(
            "{} actions given for a {} lap race, ignoring the rest",
            actions.len(),
            env.total_laps()
        );
    }

    let mut state = env.reset();
    let mut steps = Vec::with_capacity(env.total_laps() as usize);
    let mut calls = actions.iter().copied();

    loop {
        let action = calls.next().unwrap_or(PitAction::Stay);
        let (next_state, reward, done) = env.step(action);
        steps.push(StrategyStep {
            state,
            action,
            reward,
        });
        state = next_state;

        if done {
            break;
        }
    }

    Ok(Rollout {
        steps,
        total_time: env.total_time(),
    })
}

pub fn run(args: EvaluateArgs, config: &Config) -> Result<()> {
    let actions = parse_actions(&args.actions).context("Invalid --actions")?;
    let laps = args.source.driver_laps(&config.ingest)?;

    let mut environment = config.race.clone();
    if let Some(pit_loss) = args.pit_loss {
        environment.pit_stop_time_loss = pit_loss;
    }
    let seed = args.seed.or(config.training.seed);

    let rollout = replay(&laps, environment, seed, &actions)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rollout)?);
    } else {
        print_rollout("Strategy Evaluation", &laps, &rollout);
    }

    Ok(())
}
