use crate::rest::sanitize_url;
use reqwest::Url;
use std::fmt;
use thiserror::Error;

/// A network-level failure (connection refused, DNS, timeout, TLS...).
///
/// The URL is kept separately from the underlying `reqwest` error and has
/// its query string, fragment and password removed, so credentials that
/// were embedded in the configured host never reach a log line.
#[derive(Debug)]
pub struct TransportError {
    url: Option<Url>,
    source: reqwest::Error,
}

impl TransportError {
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn is_timeout(&self) -> bool {
        self.source.is_timeout()
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(sanitize_url);
        Self {
            url,
            source: err.without_url(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.url {
            Some(url) => write!(f, "transport failure contacting {url}: {}", self.source),
            None => write!(f, "transport failure: {}", self.source),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Failures while constructing a [`crate::DelugeClient`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid Deluge host URL: {0}")]
    InvalidHost(String),
    #[error("Unable to build HTTP client")]
    HttpClient(#[source] TransportError),
}

/// Failures of `auth.login`.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("authentication unsuccessful, please check that the configured password is correct")]
    Rejected,
    #[error("login succeeded but the response carried no session cookie")]
    MissingToken,
    #[error("daemon returned error {code} during login: {message}")]
    Remote { code: i64, message: String },
    #[error("unable to decode login response")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failures of `web.update_ui`.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("authentication failed, please check that you are authenticated")]
    Unauthenticated,
    #[error("error whilst getting metrics, code: {code}, message: {message}")]
    Remote { code: i64, message: String },
    #[error("unable to decode web.update_ui response")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl FetchError {
    /// True when the daemon reported that the session is missing or expired.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, FetchError::Unauthenticated)
    }
}
