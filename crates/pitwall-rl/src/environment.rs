//! Race environment - simulates one car's race lap by lap

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pitwall_core::{Compound, DriverLaps, PitwallError, Result};

use crate::state::{PitAction, RaceState, Reward};

/// Seconds lost in the pit lane per stop
pub const DEFAULT_PIT_STOP_TIME_LOSS: f64 = 20.0;

/// Base lap time used for laps without any recorded time
pub const DEFAULT_FALLBACK_LAP_TIME: f64 = 95.0;

/// Per-compound degradation in seconds per lap of stint age
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WearRates {
    pub soft: f64,
    pub medium: f64,
    pub hard: f64,
    /// Intermediates, wets and unrecognised compounds
    pub other: f64,
}

impl WearRates {
    pub fn rate(&self, compound: &Compound) -> f64 {
        match compound {
            Compound::Soft => self.soft,
            Compound::Medium => self.medium,
            Compound::Hard => self.hard,
            _ => self.other,
        }
    }
}

impl Default for WearRates {
    fn default() -> Self {
        Self {
            soft: 0.2,
            medium: 0.1,
            hard: 0.05,
            other: 0.1,
        }
    }
}

/// Environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub pit_stop_time_loss: f64,
    pub fallback_lap_time: f64,
    /// Compound fitted at the start of every episode
    pub starting_compound: Compound,
    /// Used when the lap data carries no compound at all. Empty means such
    /// data is rejected.
    pub fallback_compounds: Vec<Compound>,
    pub wear_rates: WearRates,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            pit_stop_time_loss: DEFAULT_PIT_STOP_TIME_LOSS,
            fallback_lap_time: DEFAULT_FALLBACK_LAP_TIME,
            starting_compound: Compound::Soft,
            fallback_compounds: Vec::new(),
            wear_rates: WearRates::default(),
        }
    }
}

impl EnvironmentConfig {
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("pit_stop_time_loss", self.pit_stop_time_loss),
            ("fallback_lap_time", self.fallback_lap_time),
            ("wear_rates.soft", self.wear_rates.soft),
            ("wear_rates.medium", self.wear_rates.medium),
            ("wear_rates.hard", self.wear_rates.hard),
            ("wear_rates.other", self.wear_rates.other),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(PitwallError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Single-car race simulator with a reset/step interface.
///
/// Deterministic except for the compound drawn on a pit stop, which comes
/// from the injected random source.
pub struct RaceEnvironment<R = StdRng> {
    config: EnvironmentConfig,
    laps: DriverLaps,
    total_laps: u32,
    compounds: Vec<Compound>,
    rng: R,

    lap: u32,
    compound: Compound,
    stint_age: u32,
    total_time: f64,
    done: bool,
}

impl<R: Rng> RaceEnvironment<R> {
    /// Build an environment over one driver's laps
    pub fn new(laps: &DriverLaps, config: EnvironmentConfig, rng: R) -> Result<Self> {
        config.validate()?;

        let total_laps = laps.total_laps();
        if total_laps == 0 {
            return Err(PitwallError::NoLaps);
        }

        let mut compounds = laps.compounds();
        if compounds.is_empty() {
            if config.fallback_compounds.is_empty() {
                return Err(PitwallError::EmptyCompoundSet);
            }
            warn!(
                "Lap data has no compounds, using fallback set {:?}",
                config.fallback_compounds
            );
            compounds = config.fallback_compounds.clone();
        }

        let untimed = total_laps as usize - laps.timed_lap_count();
        if untimed > 0 {
            debug!(
                "{} of {} laps untimed, using fallback base time {}s",
                untimed, total_laps, config.fallback_lap_time
            );
        }

        let compound = config.starting_compound.clone();
        let mut env = Self {
            config,
            laps: laps.clone(),
            total_laps,
            compounds,
            rng,
            lap: 1,
            compound,
            stint_age: 1,
            total_time: 0.0,
            done: false,
        };
        env.reset();
        Ok(env)
    }

    /// Start a new episode and return the initial state
    pub fn reset(&mut self) -> RaceState {
        self.lap = 1;
        self.compound = self.config.starting_compound.clone();
        self.stint_age = 1;
        self.total_time = 0.0;
        self.done = false;
        self.state()
    }

    /// Drive the current lap, then apply `action`.
    ///
    /// Returns the next state, the reward (negative lap time) and whether the
    /// race is over. Once the race is over this is a no-op returning a zero
    /// reward.
    pub fn step(&mut self, action: PitAction) -> (RaceState, Reward, bool) {
        if self.done {
            return (self.state(), 0.0, true);
        }

        let wear_penalty = self.config.wear_rates.rate(&self.compound) * f64::from(self.stint_age);
        let mut lap_time = self.base_lap_time(self.lap) + wear_penalty;

        match action {
            PitAction::Pit => {
                lap_time += self.config.pit_stop_time_loss;
                if let Some(next) = self.compounds.choose(&mut self.rng) {
                    self.compound = next.clone();
                }
                self.stint_age = 1;
            }
            PitAction::Stay => {
                self.stint_age += 1;
            }
        }

        self.total_time += lap_time;
        self.lap += 1;
        if self.lap > self.total_laps {
            self.done = true;
        }

        (self.state(), -lap_time, self.done)
    }
}

impl<R> RaceEnvironment<R> {
    pub fn state(&self) -> RaceState {
        RaceState::new(self.lap, self.compound.clone(), self.stint_age)
    }

    /// Recorded base time for `lap`, or the configured fallback
    pub fn base_lap_time(&self, lap: u32) -> f64 {
        self.laps
            .base_lap_time(lap)
            .unwrap_or(self.config.fallback_lap_time)
    }

    pub fn lap(&self) -> u32 {
        self.lap
    }

    pub fn stint_age(&self) -> u32 {
        self.stint_age
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn total_laps(&self) -> u32 {
        self.total_laps
    }

    /// Compounds a pit stop can draw from
    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }
}

impl RaceEnvironment<StdRng> {
    /// Build with a seeded `StdRng`, or an entropy-seeded one when `seed` is `None`
    pub fn with_seed(laps: &DriverLaps, config: EnvironmentConfig, seed: Option<u64>) -> Result<Self> {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self::new(laps, config, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitwall_core::{LapRecord, MAX_LAP_NUMBER};

    fn constant_race(laps: u32, compounds: &[&str], lap_time: f64) -> DriverLaps {
        let records = (1..=laps)
            .map(|n| {
                let compound = compounds[(n as usize - 1) % compounds.len()];
                LapRecord::new(n, Some(Compound::from(compound)), Some(lap_time))
            })
            .collect();
        DriverLaps::new(records).unwrap()
    }

    fn env(laps: &DriverLaps) -> RaceEnvironment {
        RaceEnvironment::with_seed(laps, EnvironmentConfig::default(), Some(7)).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let laps = constant_race(5, &["MEDIUM"], 90.0);
        let env = env(&laps);

        assert_eq!(env.state(), RaceState::new(1, Compound::Soft, 1));
        assert_eq!(env.total_laps(), 5);
        assert_eq!(env.total_time(), 0.0);
        assert!(!env.is_done());
    }

    #[test]
    fn test_stay_lap_time_includes_wear() {
        let laps = constant_race(5, &["SOFT"], 90.0);
        let mut env = env(&laps);

        let (state, reward, done) = env.step(PitAction::Stay);
        assert_eq!(state, RaceState::new(2, Compound::Soft, 2));
        assert!((reward + 90.2).abs() < 1e-9);
        assert!(!done);

        let (_, reward, _) = env.step(PitAction::Stay);
        assert!((reward + 90.4).abs() < 1e-9);
        assert!((env.total_time() - 180.6).abs() < 1e-9);
    }

    #[test]
    fn test_pit_adds_time_loss_and_resets_stint() {
        let laps = constant_race(5, &["SOFT"], 90.0);
        let mut env = env(&laps);

        env.step(PitAction::Stay);
        env.step(PitAction::Stay);
        let (state, reward, _) = env.step(PitAction::Pit);

        assert_eq!(state.stint_age, 1);
        assert_eq!(state.lap, 4);
        assert_eq!(state.compound, Compound::Soft);
        // Lap 3 driven at stint age 3 plus the stop
        assert!((reward + (90.0 + 0.6 + 20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_terminal_step_is_noop() {
        let laps = constant_race(2, &["SOFT"], 90.0);
        let mut env = env(&laps);

        env.step(PitAction::Stay);
        let (final_state, _, done) = env.step(PitAction::Stay);
        assert!(done);
        let total = env.total_time();

        for action in [PitAction::Pit, PitAction::Stay, PitAction::Pit] {
            let (state, reward, done) = env.step(action);
            assert!(done);
            assert_eq!(reward, 0.0);
            assert_eq!(state, final_state);
            assert_eq!(env.total_time(), total);
        }
    }

    #[test]
    fn test_reset_clears_episode() {
        let laps = constant_race(4, &["SOFT", "HARD"], 90.0);
        let mut env = env(&laps);

        env.step(PitAction::Pit);
        env.step(PitAction::Stay);
        env.step(PitAction::Stay);
        env.step(PitAction::Stay);
        assert!(env.is_done());

        let state = env.reset();
        assert_eq!(state, RaceState::new(1, Compound::Soft, 1));
        assert_eq!(env.total_time(), 0.0);
        assert!(!env.is_done());
    }

    #[test]
    fn test_missing_lap_uses_fallback() {
        let laps = DriverLaps::new(vec![
            LapRecord::new(1, Some(Compound::Soft), Some(90.0)),
            LapRecord::new(3, Some(Compound::Soft), None),
        ])
        .unwrap();
        let mut env = env(&laps);

        assert_eq!(env.total_laps(), 3);
        assert_eq!(env.base_lap_time(2), DEFAULT_FALLBACK_LAP_TIME);
        assert_eq!(env.base_lap_time(3), DEFAULT_FALLBACK_LAP_TIME);

        env.step(PitAction::Stay);
        let (_, reward, _) = env.step(PitAction::Stay);
        assert!((reward + (95.0 + 0.4)).abs() < 1e-9);
    }

    #[test]
    fn test_sparse_race_at_lap_cap() {
        let laps = DriverLaps::new(vec![
            LapRecord::new(1, Some(Compound::Soft), Some(90.0)),
            LapRecord::new(MAX_LAP_NUMBER, Some(Compound::Soft), Some(91.0)),
        ])
        .unwrap();
        let mut env = env(&laps);

        assert_eq!(env.total_laps(), MAX_LAP_NUMBER);
        assert_eq!(env.base_lap_time(500), DEFAULT_FALLBACK_LAP_TIME);
        assert_eq!(env.base_lap_time(MAX_LAP_NUMBER), 91.0);

        let mut steps = 0;
        loop {
            steps += 1;
            let (state, _, done) = env.step(PitAction::Pit);
            if done {
                assert_eq!(state.lap, MAX_LAP_NUMBER + 1);
                break;
            }
        }
        assert_eq!(steps, MAX_LAP_NUMBER);
        assert_eq!(env.step(PitAction::Stay).1, 0.0);
    }

    #[test]
    fn test_configured_fallback_lap_time() {
        let laps = DriverLaps::new(vec![LapRecord::new(2, Some(Compound::Hard), Some(80.0))]).unwrap();
        let config = EnvironmentConfig {
            fallback_lap_time: 100.0,
            ..EnvironmentConfig::default()
        };
        let env = RaceEnvironment::with_seed(&laps, config, Some(1)).unwrap();
        assert_eq!(env.base_lap_time(1), 100.0);
        assert_eq!(env.base_lap_time(2), 80.0);
    }

    #[test]
    fn test_empty_compound_set_rejected() {
        let laps = DriverLaps::new(vec![LapRecord::new(1, None, Some(90.0))]).unwrap();
        let result = RaceEnvironment::with_seed(&laps, EnvironmentConfig::default(), Some(1));
        assert!(matches!(result, Err(PitwallError::EmptyCompoundSet)));
    }

    #[test]
    fn test_fallback_compounds_used_when_configured() {
        let laps = DriverLaps::new(vec![LapRecord::new(1, None, Some(90.0))]).unwrap();
        let config = EnvironmentConfig {
            fallback_compounds: vec![Compound::Medium],
            ..EnvironmentConfig::default()
        };
        let mut env = RaceEnvironment::with_seed(&laps, config, Some(1)).unwrap();
        assert_eq!(env.compounds(), &[Compound::Medium]);

        let (state, _, done) = env.step(PitAction::Pit);
        assert_eq!(state.compound, Compound::Medium);
        assert!(done);
    }

    #[test]
    fn test_pit_draws_from_available_compounds() {
        let laps = constant_race(40, &["SOFT", "MEDIUM", "HARD"], 90.0);
        let mut env = env(&laps);

        let mut drawn = Vec::new();
        while !env.is_done() {
            let (state, _, _) = env.step(PitAction::Pit);
            drawn.push(state.compound);
        }

        assert!(drawn.iter().all(|c| env.compounds().contains(c)));
        assert!(drawn.iter().any(|c| *c != drawn[0]));
    }

    #[test]
    fn test_seeded_environments_agree() {
        let laps = constant_race(20, &["SOFT", "MEDIUM", "HARD"], 90.0);
        let mut a = RaceEnvironment::with_seed(&laps, EnvironmentConfig::default(), Some(42)).unwrap();
        let mut b = RaceEnvironment::with_seed(&laps, EnvironmentConfig::default(), Some(42)).unwrap();

        for _ in 0..20 {
            assert_eq!(a.step(PitAction::Pit), b.step(PitAction::Pit));
        }
        assert_eq!(a.total_time(), b.total_time());
    }

    #[test]
    fn test_unknown_compound_uses_other_rate() {
        let rates = WearRates::default();
        assert_eq!(rates.rate(&Compound::Soft), 0.2);
        assert_eq!(rates.rate(&Compound::Medium), 0.1);
        assert_eq!(rates.rate(&Compound::Hard), 0.05);
        assert_eq!(rates.rate(&Compound::Wet), 0.1);
        assert_eq!(rates.rate(&Compound::from("C6")), 0.1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let laps = constant_race(3, &["SOFT"], 90.0);
        let config = EnvironmentConfig {
            pit_stop_time_loss: -5.0,
            ..EnvironmentConfig::default()
        };
        let result = RaceEnvironment::with_seed(&laps, config, Some(1));
        assert!(matches!(result, Err(PitwallError::Config(_))));

        let config = EnvironmentConfig {
            wear_rates: WearRates {
                hard: f64::NAN,
                ..WearRates::default()
            },
            ..EnvironmentConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
