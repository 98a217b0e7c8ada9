//! Engine settings, read from a TOML file. Every field has a default.
use crate::models::DifficultyFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub database_path: PathBuf,
    /// Items per day the learner aims to complete
    pub daily_target: u32,
    pub max_due_per_session: usize,
    pub max_new_per_session: usize,
    pub difficulty: DifficultyFilter,
    /// Fixed seed for new-item selection; random when absent
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("srs.sqlite3"),
            daily_target: 20,
            max_due_per_session: 5,
            max_new_per_session: 5,
            difficulty: DifficultyFilter::All,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
