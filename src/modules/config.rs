use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use log::{info, LevelFilter};

use crate::modules::error::ConfigError;
use crate::{DEFAULT_DATA_DIR, DEFAULT_HASH_ROUNDS, USERS_FILE};

const ENV_PREFIX: &str = "ADMIN_BOOTSTRAP";

/// Runtime settings for the credential store and its logging
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub users_file: String,
    pub hash_rounds: u32,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            users_file: USERS_FILE.to_string(),
            hash_rounds: DEFAULT_HASH_ROUNDS,
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `ADMIN_BOOTSTRAP_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            data_dir: try_load(&lookup, "DATA_DIR", defaults.data_dir.display())?,
            users_file: try_load(&lookup, "USERS_FILE", defaults.users_file)?,
            hash_rounds: try_load(&lookup, "HASH_ROUNDS", defaults.hash_rounds)?,
            log_level: try_load(&lookup, "LOG_LEVEL", defaults.log_level)?,
            log_file: lookup(&env_key("LOG_FILE"))
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the store cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.users_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: env_key("USERS_FILE"),
                message: "users file name cannot be empty".to_string(),
            });
        }
        if self.hash_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                key: env_key("HASH_ROUNDS"),
                message: "hash rounds must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Full path of the persisted credential file
    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }
}

fn env_key(suffix: &str) -> String {
    format!("{}_{}", ENV_PREFIX, suffix)
}

fn try_load<F, T, D>(lookup: &F, suffix: &str, default: D) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
    D: Display,
{
    let key = env_key(suffix);
    let raw = match lookup(&key) {
        Some(value) => value,
        None => {
            info!("{key} not set, using default: {default}");
            default.to_string()
        }
    };

    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            message: e.to_string(),
        })
}
