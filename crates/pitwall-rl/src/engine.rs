//! Strategy Engine - coordinates training episodes and the greedy rollout

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pitwall_core::{DriverLaps, Result};

use crate::algorithm::{AgentConfig, QLearningAgent, RLAlgorithm};
use crate::environment::{EnvironmentConfig, RaceEnvironment};
use crate::rollout::{Rollout, StrategyStep};

/// Mixed into the configured seed so the agent's exploration stream differs
/// from the environment's compound draws
const AGENT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Training loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub episodes: usize,
    /// Seed for every random source; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 300,
            seed: None,
        }
    }
}

/// Everything needed to plan a strategy for one driver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub environment: EnvironmentConfig,
    pub agent: AgentConfig,
    pub training: TrainingConfig,
}

/// Run one exploratory training episode. Returns the episode's race time and
/// number of steps.
pub fn run_episode<R: Rng, A: RLAlgorithm>(env: &mut RaceEnvironment<R>, agent: &mut A) -> (f64, u64) {
    let mut state = env.reset();
    let mut steps = 0;

    loop {
        let action = agent.select_action(&state);
        let (next_state, reward, done) = env.step(action);
        agent.update(&state, action, reward, &next_state);
        state = next_state;
        steps += 1;

        if done {
            break;
        }
    }

    (env.total_time(), steps)
}

/// Drive one race with the agent's greedy policy, without learning
pub fn greedy_rollout<R: Rng, A: RLAlgorithm>(env: &mut RaceEnvironment<R>, agent: &A) -> Rollout {
    let mut state = env.reset();
    let mut steps = Vec::with_capacity(env.total_laps() as usize);

    loop {
        let action = agent.greedy_action(&state);
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

    Rollout {
        steps,
        total_time: env.total_time(),
    }
}

/// Engine statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineStats {
    pub episodes: usize,
    pub total_steps: u64,
    pub best_episode_time: Option<f64>,
    pub last_episode_time: Option<f64>,
    pub mean_episode_time: Option<f64>,
    pub states_visited: usize,
}

impl EngineStats {
    fn record_episode(&mut self, total_time: f64, steps: u64) {
        let previous_sum = self.mean_episode_time.unwrap_or(0.0) * self.episodes as f64;
        self.episodes += 1;
        self.total_steps += steps;
        self.best_episode_time = Some(self.best_episode_time.map_or(total_time, |best| best.min(total_time)));
        self.last_episode_time = Some(total_time);
        self.mean_episode_time = Some((previous_sum + total_time) / self.episodes as f64);
    }
}

/// Trains a Q-learning agent on one driver's race and extracts its strategy
pub struct StrategyEngine {
    env: RaceEnvironment,
    agent: QLearningAgent,
    episodes: usize,
    stats: EngineStats,
}

impl StrategyEngine {
    pub fn new(laps: &DriverLaps, config: &StrategyConfig) -> Result<Self> {
        let seed = config.training.seed;
        let env = RaceEnvironment::with_seed(laps, config.environment.clone(), seed)?;
        let agent = QLearningAgent::with_seed(config.agent.clone(), seed.map(|s| s ^ AGENT_SEED_SALT))?;

        debug!(
            "Strategy engine ready: {} laps, compounds {:?}, {} episodes",
            env.total_laps(),
            env.compounds(),
            config.training.episodes
        );

        Ok(Self {
            env,
            agent,
            episodes: config.training.episodes,
            stats: EngineStats::default(),
        })
    }

    /// Run the configured number of training episodes
    pub fn train(&mut self) -> &EngineStats {
        for episode in 0..self.episodes {
            let (total_time, steps) = run_episode(&mut self.env, &mut self.agent);
            self.stats.record_episode(total_time, steps);
            debug!("Episode {} complete, race time {:.3}s", episode + 1, total_time);
        }
        self.stats.states_visited = self.agent.q_table().len();

        info!(
            "Training complete: {} episodes, best race time {:.3}s, {} states visited",
            self.stats.episodes,
            self.stats.best_episode_time.unwrap_or(f64::NAN),
            self.stats.states_visited
        );

        &self.stats
    }

    /// One noiseless race under the learned greedy policy
    pub fn rollout(&mut self) -> Rollout {
        let rollout = greedy_rollout(&mut self.env, &self.agent);
        info!(
            "Greedy rollout: {} laps, {} stops at laps {:?}, total {:.3}s",
            rollout.len(),
            rollout.pit_count(),
            rollout.pit_laps(),
            rollout.total_time
        );
        rollout
    }

    /// Train, then roll out
    pub fn run(&mut self) -> Rollout {
        self.train();
        self.rollout()
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn agent(&self) -> &QLearningAgent {
        &self.agent
    }

    pub fn environment(&self) -> &RaceEnvironment {
        &self.env
    }
}

/// Plan a pit strategy for one driver: train for the configured episodes,
/// then return the greedy rollout
pub fn run_q_learning_strategy(laps: &DriverLaps, config: &StrategyConfig) -> Result<Rollout> {
    let mut engine = StrategyEngine::new(laps, config)?;
    Ok(engine.run())
}
