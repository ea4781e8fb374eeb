//! Tire compound types

use serde::{Deserialize, Serialize};

/// Tire compound fitted to the car
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Compound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
    /// Any other label found in the data, stored upper-cased
    Other(String),
}

impl Compound {
    pub fn as_str(&self) -> &str {
        match self {
            Compound::Soft => "SOFT",
            Compound::Medium => "MEDIUM",
            Compound::Hard => "HARD",
            Compound::Intermediate => "INTERMEDIATE",
            Compound::Wet => "WET",
            Compound::Other(label) => label,
        }
    }
}

impl std::fmt::Display for Compound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Compound {
    fn from(s: &str) -> Self {
        let label = s.trim().to_uppercase();
        match label.as_str() {
            "SOFT" => Compound::Soft,
            "MEDIUM" => Compound::Medium,
            "HARD" => Compound::Hard,
            "INTERMEDIATE" => Compound::Intermediate,
            "WET" => Compound::Wet,
            _ => Compound::Other(label),
        }
    }
}

impl From<String> for Compound {
    fn from(s: String) -> Self {
        Compound::from(s.as_str())
    }
}

impl From<Compound> for String {
    fn from(compound: Compound) -> Self {
        compound.as_str().to_string()
    }
}
