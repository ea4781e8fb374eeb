//! Configuration management

use anyhow::{Context, Result};
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use pitwall_core::IngestConfig;
use pitwall_rl::{AgentConfig, EnvironmentConfig, StrategyConfig, TrainingConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub race: EnvironmentConfig,
    pub agent: AgentConfig,
    pub training: TrainingConfig,
    pub ingest: IngestConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_file(),
        };

        Self::build(
            config_path.as_deref(),
            Environment::with_prefix("PITWALL")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn build(config_path: Option<&Path>, environment: Environment) -> Result<Self> {
        let mut builder = ConfigBuilder::<config::builder::DefaultState>::default();

        if let Some(path) = config_path {
            tracing::debug!("Loading config from: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        } else {
            tracing::debug!("No config file found, using defaults");
        }

        let config = builder
            .add_source(environment)
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Find the configuration file
    fn find_config_file() -> Option<PathBuf> {
        Self::locate_config_file(
            std::env::var_os("PITWALL_CONFIG").map(PathBuf::from),
            PathBuf::from("pitwall.toml"),
            dirs::home_dir(),
        )
    }

    /// Check in order: PITWALL_CONFIG env, ./pitwall.toml, ~/.config/pitwall/pitwall.toml.
    /// Candidates that do not exist are skipped.
    fn locate_config_file(env_path: Option<PathBuf>, local: PathBuf, home: Option<PathBuf>) -> Option<PathBuf> {
        let user_config = home.map(|home| home.join(".config").join("pitwall").join("pitwall.toml"));

        env_path
            .into_iter()
            .chain(std::iter::once(local))
            .chain(user_config)
            .find(|path| path.exists())
    }

    /// The planner settings, without the ingest section
    pub fn strategy(&self) -> StrategyConfig {
        StrategyConfig {
            environment: self.race.clone(),
            agent: self.agent.clone(),
            training: self.training.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitwall_core::Compound;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Environment::with_prefix("PITWALL")
            .separator("__")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = Config::build(None, env(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.race.pit_stop_time_loss, 20.0);
        assert_eq!(config.agent.epsilon, 0.2);
        assert_eq!(config.training.episodes, 300);
        assert_eq!(config.ingest.lap_time_column, "LapTime");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[race]
pit_stop_time_loss = 22.5
starting_compound = "medium"

[race.wear_rates]
soft = 0.3

[agent]
epsilon = 0.05

[training]
episodes = 1000
seed = 42
"#
        )
        .unwrap();

        let config = Config::build(Some(file.path()), env(&[])).unwrap();
        assert_eq!(config.race.pit_stop_time_loss, 22.5);
        assert_eq!(config.race.starting_compound, Compound::Medium);
        assert_eq!(config.race.wear_rates.soft, 0.3);
        assert_eq!(config.race.wear_rates.hard, 0.05);
        assert_eq!(config.agent.epsilon, 0.05);
        assert_eq!(config.agent.learning_rate, 0.1);
        assert_eq!(config.training.episodes, 1000);
        assert_eq!(config.training.seed, Some(42));
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[training]\nepisodes = 50\n").unwrap();

        let config = Config::build(
            Some(file.path()),
            env(&[
                ("PITWALL__TRAINING__EPISODES", "75"),
                ("PITWALL__RACE__PIT_STOP_TIME_LOSS", "18.5"),
            ]),
        )
        .unwrap();
        assert_eq!(config.training.episodes, 75);
        assert_eq!(config.race.pit_stop_time_loss, 18.5);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Config::build(Some(Path::new("/nonexistent/pitwall.toml")), env(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_file_lookup_order() {
        let dir = tempfile::tempdir().unwrap();
        let from_env = dir.path().join("env.toml");
        let local = dir.path().join("pitwall.toml");
        let home = dir.path().join("home");
        let user_config = home.join(".config").join("pitwall").join("pitwall.toml");
        std::fs::create_dir_all(user_config.parent().unwrap()).unwrap();
        std::fs::write(&user_config, "").unwrap();

        // Env path missing on disk falls through to the local file
        std::fs::write(&local, "").unwrap();
        let found = Config::locate_config_file(Some(from_env.clone()), local.clone(), Some(home.clone()));
        assert_eq!(found, Some(local.clone()));

        std::fs::write(&from_env, "").unwrap();
        let found = Config::locate_config_file(Some(from_env.clone()), local.clone(), Some(home.clone()));
        assert_eq!(found, Some(from_env));

        std::fs::remove_file(&local).unwrap();
        let found = Config::locate_config_file(None, local.clone(), Some(home.clone()));
        assert_eq!(found, Some(user_config));

        assert_eq!(Config::locate_config_file(None, local, None), None);
    }

    #[test]
    fn test_strategy_section() {
        let mut config = Config::default();
        config.training.seed = Some(7);
        config.race.pit_stop_time_loss = 25.0;

        let strategy = config.strategy();
        assert_eq!(strategy.training.seed, Some(7));
        assert_eq!(strategy.environment.pit_stop_time_loss, 25.0);
    }

    #[test]
    fn test_example_file_parses() {
        let example = include_str!("../../../pitwall.toml.example");
        let parsed: Config = toml::from_str(example).unwrap();
        assert_eq!(parsed.strategy().training.episodes, 300);
        assert_eq!(parsed.ingest.driver_column, "DriverNumber");
    }
}
