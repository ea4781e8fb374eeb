//! Strategy planning command

use anyhow::{Context, Result};
use clap::Args;

use pitwall_rl::{StrategyConfig, StrategyEngine};

use super::{print_rollout, LapSource};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    source: LapSource,

    /// Number of training episodes
    #[arg(short, long)]
    episodes: Option<usize>,

    /// Seed for reproducible training
    #[arg(short, long)]
    seed: Option<u64>,

    /// Exploration rate during training
    #[arg(long)]
    epsilon: Option<f64>,

    /// Seconds lost on a pit stop
    #[arg(long)]
    pit_loss: Option<f64>,

    /// Print the strategy as JSON
    #[arg(long)]
    json: bool,
}

impl SimulateArgs {
    /// Command-line flags take precedence over file and environment settings
    fn strategy(&self, config: &Config) -> StrategyConfig {
        let mut strategy = config.strategy();
        if let Some(episodes) = self.episodes {
            strategy.training.episodes = episodes;
        }
        if let Some(seed) = self.seed {
            strategy.training.seed = Some(seed);
        }
        if let Some(epsilon) = self.epsilon {
            strategy.agent.epsilon = epsilon;
        }
        if let Some(pit_loss) = self.pit_loss {
            strategy.environment.pit_stop_time_loss = pit_loss;
        }
        strategy
    }
}

pub fn run(args: SimulateArgs, config: &Config) -> Result<()> {
    let laps = args.source.driver_laps(&config.ingest)?;
    let strategy = args.strategy(config);

    let mut engine = StrategyEngine::new(&laps, &strategy).context("Invalid strategy configuration")?;
    engine.train();
    let rollout = engine.rollout();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rollout)?);
        return Ok(());
    }

    print_rollout("Recommended Strategy", &laps, &rollout);
    let stats = engine.stats();
    println!(
        "Trained {} episodes ({} states), best training race {:.3}s",
        stats.episodes,
        stats.states_visited,
        stats.best_episode_time.unwrap_or(rollout.total_time)
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> SimulateArgs {
        SimulateArgs {
            source: LapSource {
                laps: PathBuf::from("laps.csv"),
                driver: None,
            },
            episodes: None,
            seed: None,
            epsilon: None,
            pit_loss: None,
            json: false,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        config.training.episodes = 10;
        config.agent.epsilon = 0.3;

        let mut args = args();
        args.episodes = Some(500);
        args.seed = Some(9);
        args.pit_loss = Some(23.0);

        let strategy = args.strategy(&config);
        assert_eq!(strategy.training.episodes, 500);
        assert_eq!(strategy.training.seed, Some(9));
        assert_eq!(strategy.environment.pit_stop_time_loss, 23.0);
        assert_eq!(strategy.agent.epsilon, 0.3);
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let config = Config::default();
        assert_eq!(args().strategy(&config), config.strategy());
    }
}
