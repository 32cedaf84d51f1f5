//! Manages the `/etc/deluge_stats.conf` file.

mod daemon;
mod top_config;

pub use daemon::DaemonConfig;
pub use top_config::{Config, ConfigError, CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH};
