use deluge_rpc::{AuthError, FetchError};
use std::fmt;
use thiserror::Error;

/// Which step of a poll cycle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStage {
    Authenticate,
    Fetch,
}

impl fmt::Display for PollStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollStage::Authenticate => f.write_str("authenticate"),
            PollStage::Fetch => f.write_str("fetch"),
        }
    }
}

/// The failure that ended a poll cycle. No records were emitted.
#[derive(Error, Debug)]
pub enum PollError {
    #[error("unable to authenticate with deluge, please check config")]
    Authenticate(#[source] AuthError),
    #[error("unable to get metrics from deluge")]
    Fetch(#[source] FetchError),
}

impl PollError {
    pub fn stage(&self) -> PollStage {
        match self {
            PollError::Authenticate(_) => PollStage::Authenticate,
            PollError::Fetch(_) => PollStage::Fetch,
        }
    }
}
