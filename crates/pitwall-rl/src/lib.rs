//! Pitwall RL - Reinforcement learning for pit-stop strategy
//!
//! This crate provides the race environment, a tabular Q-learning agent and
//! the engine that trains the agent over simulated races and extracts a
//! recommended stop/stay sequence.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::float_cmp)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithm;
pub mod engine;
pub mod environment;
pub mod rollout;
pub mod state;

pub use algorithm::{AgentConfig, QLearningAgent, QTable, RLAlgorithm};
pub use engine::{run_q_learning_strategy, EngineStats, StrategyConfig, StrategyEngine, TrainingConfig};
pub use environment::{EnvironmentConfig, RaceEnvironment, WearRates};
pub use rollout::{Rollout, StrategyStep, Stint};
pub use state::{PitAction, RaceState, Reward};
