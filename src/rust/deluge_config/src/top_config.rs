//! Top-level configuration file for the Deluge collector.

use crate::DaemonConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use toml_edit::DocumentMut;
use tracing::{error, info};

/// Where the configuration lives unless overridden.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/deluge_stats.conf";

/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_ENV_VAR: &str = "DELUGE_STATS_CONFIG";

const EXAMPLE_CONFIG: &str = include_str!("../../../deluge_stats.example.conf");

fn default_interval() -> u64 {
    10
}

/// Top-level configuration file for the Deluge collector.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Seconds between two polls of every daemon.
    #[serde(default = "default_interval")]
    pub poll_interval_seconds: u64,

    /// Upper bound on a single HTTP request, in seconds. A daemon that
    /// doesn't answer in time counts as a transport failure.
    #[serde(default = "default_interval")]
    pub request_timeout_seconds: u64,

    /// The Web UIs to poll. Each gets its own client and session.
    #[serde(default)]
    pub daemons: Vec<DaemonConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_interval(),
            request_timeout_seconds: default_interval(),
            daemons: vec![DaemonConfig::default()],
        }
    }
}

impl Config {
    /// Loads the file named by `DELUGE_STATS_CONFIG`, falling back to
    /// `/etc/deluge_stats.conf`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            error!("{} does not exist!", path.display());
            return Err(ConfigError::ConfigDoesNotExist(path.display().to_string()));
        }
        info!("Loading configuration from {}", path.display());
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::load_from_string(&raw),
            Err(e) => {
                error!("Unable to read contents of {}", path.display());
                error!("{e:?}");
                Err(ConfigError::CannotReadFile(path.display().to_string()))
            }
        }
    }

    /// Parses and validates a configuration document.
    pub fn load_from_string(raw: &str) -> Result<Self, ConfigError> {
        let document = raw.parse::<DocumentMut>().map_err(|e| {
            error!("Unable to parse TOML configuration");
            error!("Full error: {:?}", e);
            ConfigError::CannotParseToml
        })?;
        let config = toml_edit::de::from_document::<Config>(document).map_err(|e| {
            error!("Unable to parse TOML configuration");
            error!("Full error: {:?}", e);
            ConfigError::CannotParseToml
        })?;
        config.validate().map_err(|e| {
            error!("Invalid configuration: {e}");
            ConfigError::Invalid(e)
        })?;
        Ok(config)
    }

    /// Test is a configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.daemons.is_empty() {
            return Err("At least one [[daemons]] section is required".to_string());
        }
        if self.poll_interval_seconds == 0 {
            return Err("poll_interval_seconds must be greater than zero".to_string());
        }
        if self.request_timeout_seconds == 0 {
            return Err("request_timeout_seconds must be greater than zero".to_string());
        }
        if self.request_timeout_seconds > self.poll_interval_seconds {
            return Err(format!(
                "request_timeout_seconds ({}) may not exceed poll_interval_seconds ({})",
                self.request_timeout_seconds, self.poll_interval_seconds
            ));
        }
        for daemon in self.daemons.iter() {
            daemon.validate()?;
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// A commented example configuration file.
    pub fn sample() -> &'static str {
        EXAMPLE_CONFIG
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} not found. You must setup this file to use deluge_stats.")]
    ConfigDoesNotExist(String),
    #[error("Unable to read contents of {0}.")]
    CannotReadFile(String),
    #[error("Unable to parse TOML configuration")]
    CannotParseToml,
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
