//! State, Action, and Reward types for RL

use serde::{Deserialize, Serialize};

use pitwall_core::{Compound, PitwallError};

/// Reward value from environment (negative lap time in seconds)
pub type Reward = f64;

/// Observable race state: (lap, compound, stint age)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RaceState {
    /// Lap about to be driven, starting at 1
    pub lap: u32,
    pub compound: Compound,
    /// Laps driven on the current set, 1 on a fresh set
    pub stint_age: u32,
}

impl RaceState {
    pub fn new(lap: u32, compound: Compound, stint_age: u32) -> Self {
        Self {
            lap,
            compound,
            stint_age,
        }
    }
}

impl std::fmt::Display for RaceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(lap {}, {}, stint age {})",
            self.lap, self.compound, self.stint_age
        )
    }
}

/// Decision taken at the end of each lap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitAction {
    /// Stay out on the current tires
    Stay,
    /// Pit for a new set
    Pit,
}

impl PitAction {
    /// Every action in enumeration order. Greedy selection breaks ties in
    /// favour of the earlier entry.
    pub const ALL: [PitAction; 2] = [PitAction::Stay, PitAction::Pit];

    /// Convert action to index for the discrete action space
    pub fn to_index(self) -> usize {
        match self {
            PitAction::Stay => 0,
            PitAction::Pit => 1,
        }
    }

    /// Number of discrete actions
    pub const fn action_space_size() -> usize {
        Self::ALL.len()
    }
}

impl std::fmt::Display for PitAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PitAction::Stay => write!(f, "stay"),
            PitAction::Pit => write!(f, "pit"),
        }
    }
}

impl std::str::FromStr for PitAction {
    type Err = PitwallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stay" => Ok(PitAction::Stay),
            "pit" => Ok(PitAction::Pit),
            _ => Err(PitwallError::InvalidAction(s.to_string())),
        }
    }
}
