//! Greedy-policy rollout output

use serde::{Deserialize, Serialize};

use pitwall_core::Compound;

use crate::state::{PitAction, RaceState, Reward};

/// One lap of the recommended strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyStep {
    pub state: RaceState,
    pub action: PitAction,
    pub reward: Reward,
}

/// Consecutive laps on one set of tires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stint {
    pub compound: Compound,
    pub start_lap: u32,
    pub laps: u32,
}

/// A full race driven under the greedy policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rollout {
    pub steps: Vec<StrategyStep>,
    /// Total simulated race time in seconds
    pub total_time: f64,
}

impl Rollout {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Laps at the end of which the car pits
    pub fn pit_laps(&self) -> Vec<u32> {
        self.steps
            .iter()
            .filter(|step| step.action == PitAction::Pit)
            .map(|step| step.state.lap)
            .collect()
    }

    pub fn pit_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.action == PitAction::Pit)
            .count()
    }

    /// Stints as driven, in race order
    pub fn stints(&self) -> Vec<Stint> {
        let mut stints: Vec<Stint> = Vec::new();
        let mut fresh_set = true;

        for step in &self.steps {
            if fresh_set {
                stints.push(Stint {
                    compound: step.state.compound.clone(),
                    start_lap: step.state.lap,
                    laps: 1,
                });
            } else if let Some(current) = stints.last_mut() {
                current.laps += 1;
            }
            fresh_set = step.action == PitAction::Pit;
        }

        stints
    }
}
