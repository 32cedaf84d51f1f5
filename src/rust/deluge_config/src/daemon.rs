use serde::{Deserialize, Serialize};
use std::fmt;

/// One Deluge Web UI to poll.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonConfig {
    /// Deluge WebUI url, e.g. `http://localhost:8112`
    pub host: String,

    /// Deluge WebUI password
    pub password: String,
}

impl DaemonConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err("Daemon host must be set".to_string());
        }
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(format!(
                "Daemon host [{}] must start with http:// or https://",
                self.host
            ));
        }
        if self.password.is_empty() {
            return Err(format!("Daemon [{}] has no password set", self.host));
        }
        Ok(())
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:8112".to_string(),
            password: "deluge".to_string(),
        }
    }
}

// Hand-written so the password never ends up in a log line.
impl fmt::Debug for DaemonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DaemonConfig")
            .field("host", &self.host)
            .field("password", &"<redacted>")
            .finish()
    }
}
