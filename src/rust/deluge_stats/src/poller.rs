//! Per-daemon polling tasks.

use crate::collector::Collector;
use crate::sink::{Accumulator, MemorySink, SharedSink};
use deluge_config::DaemonConfig;
use deluge_rpc::{ClientError, DelugeApi, DelugeClient};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Builds a collector with its own client (and so its own session) for one daemon.
pub fn build_collector(
    daemon: &DaemonConfig,
    request_timeout: Duration,
) -> Result<Collector<DelugeClient>, ClientError> {
    let client = DelugeClient::new(&daemon.host, &daemon.password, request_timeout)?;
    Ok(Collector::new(client))
}

/// Logs in ahead of the first poll. A failure is logged but not fatal:
/// the first poll will try again when it sees the session is missing.
pub async fn start_collector<C: DelugeApi>(host: &str, collector: &mut Collector<C>) -> bool {
    match collector.start().await {
        Ok(()) => {
            info!("Authenticated with Deluge at {host}");
            true
        }
        Err(e) => {
            error!("Unable to authenticate with Deluge at {host}: {e}");
            error!("{e:?}");
            false
        }
    }
}

/// Polls once, and only on success hands the batch to the shared sink.
/// Returns whether the poll succeeded.
pub async fn poll_and_flush<C, S>(
    host: &str,
    collector: &mut Collector<C>,
    sink: &SharedSink<S>,
) -> bool
where
    C: DelugeApi,
    S: Accumulator,
{
    let mut batch = MemorySink::default();
    match collector.poll(&mut batch).await {
        Ok(report) => {
            if !report.connected {
                warn!("Deluge Web UI at {host} is not connected to a daemon");
            }
            debug!("Polled {host}: {} torrents", report.torrents);
            sink.flush(&mut batch);
            true
        }
        Err(e) => {
            error!("Polling {host} failed during {}: {e}", e.stage());
            error!("{e:?}");
            false
        }
    }
}

/// Polls one daemon forever on a fixed interval. Ticks never overlap: a
/// slow poll delays the next tick instead of queueing extra ones.
pub async fn run_target<S>(
    daemon: DaemonConfig,
    poll_interval: Duration,
    request_timeout: Duration,
    sink: SharedSink<S>,
) -> Result<(), ClientError>
where
    S: Accumulator,
{
    let mut collector = build_collector(&daemon, request_timeout)?;
    let host = collector.client().redacted_endpoint().to_string();
    info!("Starting Deluge poller for {host} every {}s", poll_interval.as_secs());
    start_collector(&host, &mut collector).await;

    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        poll_and_flush(&host, &mut collector, &sink).await;
    }
}
