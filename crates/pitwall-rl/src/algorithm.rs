//! RL Algorithm trait and the tabular Q-learning agent

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use pitwall_core::{PitwallError, Result};

use crate::state::{PitAction, RaceState, Reward};

const ACTIONS: usize = PitAction::action_space_size();

/// Trait for RL algorithms driving the race environment
pub trait RLAlgorithm {
    /// Algorithm name
    fn name(&self) -> &str;

    /// Action to take while learning (may explore)
    fn select_action(&mut self, state: &RaceState) -> PitAction;

    /// Best known action, never explores
    fn greedy_action(&self, state: &RaceState) -> PitAction;

    /// Learn from one observed transition, returning the updated value
    fn update(
        &mut self,
        state: &RaceState,
        action: PitAction,
        reward: Reward,
        next_state: &RaceState,
    ) -> f64;
}

/// Agent hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// α, in (0, 1]
    pub learning_rate: f64,
    /// γ, in [0, 1]
    pub discount_factor: f64,
    /// ε, in [0, 1]
    pub epsilon: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            epsilon: 0.2,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(PitwallError::Config(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(PitwallError::Config(format!(
                "discount_factor must be in [0, 1], got {}",
                self.discount_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(PitwallError::Config(format!(
                "epsilon must be in [0, 1], got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Expected-return estimates per (state, action).
///
/// Unseen states read as 0 for every action. Rows are only materialized by
/// [`QTable::entry`].
#[derive(Debug, Clone, Default)]
pub struct QTable {
    values: HashMap<RaceState, [f64; ACTIONS]>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row for `state`, inserting a zeroed row on first access
    pub fn entry(&mut self, state: &RaceState) -> &mut [f64; ACTIONS] {
        self.values.entry(state.clone()).or_insert([0.0; ACTIONS])
    }

    /// Row for `state` without inserting
    pub fn values(&self, state: &RaceState) -> [f64; ACTIONS] {
        self.values.get(state).copied().unwrap_or([0.0; ACTIONS])
    }

    pub fn get(&self, state: &RaceState, action: PitAction) -> f64 {
        self.values(state)[action.to_index()]
    }

    pub fn max_value(&self, state: &RaceState) -> f64 {
        self.values(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Highest-valued action; on ties the first in [`PitAction::ALL`] wins
    pub fn best_action(&self, state: &RaceState) -> PitAction {
        let values = self.values(state);
        let mut best = PitAction::ALL[0];
        for action in PitAction::ALL {
            if values[action.to_index()] > values[best.to_index()] {
                best = action;
            }
        }
        best
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Q-Learning implementation (tabular, ε-greedy)
pub struct QLearningAgent<R = StdRng> {
    q_table: QTable,
    config: AgentConfig,
    rng: R,
}

impl<R: Rng> QLearningAgent<R> {
    pub fn new(config: AgentConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            q_table: QTable::new(),
            config,
            rng,
        })
    }
}

impl<R> QLearningAgent<R> {
    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn q_value(&self, state: &RaceState, action: PitAction) -> f64 {
        self.q_table.get(state, action)
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

impl QLearningAgent<StdRng> {
    /// Build with a seeded `StdRng`, or an entropy-seeded one when `seed` is `None`
    pub fn with_seed(config: AgentConfig, seed: Option<u64>) -> Result<Self> {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self::new(config, rng)
    }
}

impl<R: Rng> RLAlgorithm for QLearningAgent<R> {
    fn name(&self) -> &str {
        "q_learning"
    }

    fn select_action(&mut self, state: &RaceState) -> PitAction {
        if self.rng.gen::<f64>() < self.config.epsilon {
            PitAction::ALL[self.rng.gen_range(0..ACTIONS)]
        } else {
            self.greedy_action(state)
        }
    }

    fn greedy_action(&self, state: &RaceState) -> PitAction {
        self.q_table.best_action(state)
    }

    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    fn update(
        &mut self,
        state: &RaceState,
        action: PitAction,
        reward: Reward,
        next_state: &RaceState,
    ) -> f64 {
        let max_next = self.q_table.max_value(next_state);
        let td_target = reward + self.config.discount_factor * max_next;

        let row = self.q_table.entry(state);
        let old_value = row[action.to_index()];
        let td_delta = td_target - old_value;
        let new_value = old_value + self.config.learning_rate * td_delta;
        row[action.to_index()] = new_value;

        new_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitwall_core::Compound;

    fn state(lap: u32) -> RaceState {
        RaceState::new(lap, Compound::Soft, 1)
    }

    fn agent(epsilon: f64) -> QLearningAgent {
        let config = AgentConfig {
            epsilon,
            ..AgentConfig::default()
        };
        QLearningAgent::with_seed(config, Some(11)).unwrap()
    }

    #[test]
    fn test_unseen_state_defaults_to_zero() {
        let agent = agent(0.0);
        assert_eq!(agent.q_value(&state(1), PitAction::Pit), 0.0);
        assert_eq!(agent.q_value(&state(1), PitAction::Stay), 0.0);
        assert!(agent.q_table().is_empty());
    }

    #[test]
    fn test_update_from_zero() {
        let mut agent = agent(0.0);
        let new_value = agent.update(&state(1), PitAction::Stay, -100.0, &state(2));

        assert!((new_value + 10.0).abs() < 1e-12);
        assert!((agent.q_value(&state(1), PitAction::Stay) + 10.0).abs() < 1e-12);
        assert_eq!(agent.q_value(&state(1), PitAction::Pit), 0.0);
        // Only the updated state is materialized
        assert_eq!(agent.q_table().len(), 1);
    }

    #[test]
    fn test_update_bootstraps_from_best_next_value() {
        let mut agent = agent(0.0);
        agent.q_table.entry(&state(2))[PitAction::Stay.to_index()] = -50.0;
        agent.q_table.entry(&state(2))[PitAction::Pit.to_index()] = -80.0;
        agent.q_table.entry(&state(1))[PitAction::Pit.to_index()] = -20.0;

        let new_value = agent.update(&state(1), PitAction::Pit, -100.0, &state(2));

        // -20 + 0.1 * (-100 + 0.9 * -50 - (-20)) = -32.5
        assert!((new_value + 32.5).abs() < 1e-9);
    }

    #[test]
    fn test_ties_prefer_first_action() {
        let mut agent = agent(0.0);
        assert_eq!(agent.greedy_action(&state(1)), PitAction::ALL[0]);

        agent.q_table.entry(&state(1))[PitAction::Stay.to_index()] = -5.0;
        agent.q_table.entry(&state(1))[PitAction::Pit.to_index()] = -5.0;
        assert_eq!(agent.greedy_action(&state(1)), PitAction::Stay);

        agent.q_table.entry(&state(1))[PitAction::Pit.to_index()] = -4.0;
        assert_eq!(agent.greedy_action(&state(1)), PitAction::Pit);
    }

    #[test]
    fn test_zero_epsilon_is_deterministic() {
        let mut agent = agent(0.0);
        agent.q_table.entry(&state(3))[PitAction::Pit.to_index()] = 1.0;

        let first = agent.select_action(&state(3));
        let second = agent.select_action(&state(3));
        assert_eq!(first, PitAction::Pit);
        assert_eq!(first, second);

        for _ in 0..100 {
            assert_eq!(agent.select_action(&state(4)), PitAction::Stay);
        }
    }

    #[test]
    fn test_full_epsilon_explores_both_actions() {
        let mut agent = agent(1.0);
        agent.q_table.entry(&state(1))[PitAction::Stay.to_index()] = 10.0;

        let picks: Vec<PitAction> = (0..200).map(|_| agent.select_action(&state(1))).collect();
        assert!(picks.contains(&PitAction::Pit));
        assert!(picks.contains(&PitAction::Stay));
    }

    #[test]
    fn test_max_value() {
        let mut table = QTable::new();
        assert_eq!(table.max_value(&state(1)), 0.0);

        table.entry(&state(1))[0] = -3.0;
        table.entry(&state(1))[1] = -7.0;
        assert_eq!(table.max_value(&state(1)), -3.0);
        assert_eq!(table.best_action(&state(1)), PitAction::Stay);
    }

    #[test]
    fn test_config_validation() {
        assert!(AgentConfig::default().validate().is_ok());

        let bad = [
            AgentConfig { learning_rate: 0.0, ..AgentConfig::default() },
            AgentConfig { learning_rate: 1.5, ..AgentConfig::default() },
            AgentConfig { discount_factor: -0.1, ..AgentConfig::default() },
            AgentConfig { epsilon: 1.1, ..AgentConfig::default() },
            AgentConfig { epsilon: f64::NAN, ..AgentConfig::default() },
        ];
        for config in bad {
            assert!(matches!(
                QLearningAgent::with_seed(config, Some(1)),
                Err(PitwallError::Config(_))
            ));
        }
    }

    #[test]
    fn test_name() {
        assert_eq!(agent(0.2).name(), "q_learning");
    }
}
