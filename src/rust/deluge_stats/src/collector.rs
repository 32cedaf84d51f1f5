//! Drives one Deluge client through a poll cycle: fetch, re-authenticate
//! once if the session has lapsed, and flatten the snapshot into records.

use crate::errors::PollError;
use crate::records::snapshot_records;
use crate::sink::Accumulator;
use deluge_rpc::{AuthError, DelugeApi, FetchError};

/// What a successful poll saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// False when the Web UI answered but isn't attached to a daemon.
    pub connected: bool,
    pub torrents: usize,
}

pub struct Collector<C> {
    client: C,
}

impl<C: DelugeApi> Collector<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Initial login, before the first poll.
    pub async fn start(&mut self) -> Result<(), AuthError> {
        self.client.authenticate().await
    }

    /// Runs one poll cycle and hands every record to `acc`.
    ///
    /// An expired session triggers exactly one login and one re-fetch;
    /// every other failure is returned as-is. Nothing reaches `acc` unless
    /// the whole snapshot decoded.
    pub async fn poll<A>(&mut self, acc: &mut A) -> Result<PollReport, PollError>
    where
        A: Accumulator + ?Sized,
    {
        let snapshot = match self.client.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(FetchError::Unauthenticated) => {
                self.client
                    .authenticate()
                    .await
                    .map_err(PollError::Authenticate)?;
                self.client
                    .fetch_snapshot()
                    .await
                    .map_err(PollError::Fetch)?
            }
            Err(e) => return Err(PollError::Fetch(e)),
        };

        for record in snapshot_records(&snapshot) {
            acc.add_fields(&record.measurement, record.fields, record.tags);
        }

        Ok(PollReport {
            connected: snapshot.connected,
            torrents: snapshot.torrents.len(),
        })
    }
}
