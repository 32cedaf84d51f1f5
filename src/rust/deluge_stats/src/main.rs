use anyhow::{bail, Result};
use clap::Parser;
use deluge_config::Config;
use deluge_stats::poller::{build_collector, poll_and_flush, run_target, start_collector};
use deluge_stats::sink::{Accumulator, LineProtocolSink, MemorySink, SharedSink};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};

/// A plugin to gather data from Deluge.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Configuration file (defaults to $DELUGE_STATS_CONFIG, then /etc/deluge_stats.conf)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Poll every daemon once, print the records and exit
    #[arg(long)]
    once: bool,

    /// With --once, print records as JSON instead of line protocol
    #[arg(long, requires = "once")]
    json: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    sample_config: bool,

    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// `RUST_LOG` wins when it names a level; otherwise each `-v` raises the
/// level one step above the default of `warn`.
fn log_level(rust_log: Option<&str>, verbose: u8) -> LevelFilter {
    if let Some(level) = rust_log.and_then(|raw| raw.trim().parse::<LevelFilter>().ok()) {
        return level;
    }
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Logs go to stderr; stdout carries the metrics.
fn set_console_logging(level: LevelFilter) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Polls each daemon once, in turn, into `sink`. Returns how many failed.
async fn poll_all_once<S: Accumulator>(config: &Config, sink: &SharedSink<S>) -> usize {
    let mut failures = 0;
    for (index, daemon) in config.daemons.iter().enumerate() {
        let mut collector = match build_collector(daemon, config.request_timeout()) {
            Ok(collector) => collector,
            Err(e) => {
                error!("Unable to set up client for daemon #{index}: {e}");
                failures += 1;
                continue;
            }
        };
        let host = collector.client().redacted_endpoint().to_string();
        start_collector(&host, &mut collector).await;
        if !poll_and_flush(&host, &mut collector, sink).await {
            failures += 1;
        }
    }
    failures
}

async fn run_once(config: &Config, json: bool) -> Result<()> {
    let failures = if json {
        let sink = SharedSink::new(MemorySink::default());
        let failures = poll_all_once(config, &sink).await;
        let out = sink.with(|records| serde_json::to_string_pretty(records.records()))?;
        println!("{out}");
        failures
    } else {
        poll_all_once(config, &SharedSink::new(LineProtocolSink::stdout())).await
    };

    if failures > 0 {
        bail!("{failures} of {} daemons could not be polled", config.daemons.len());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if args.sample_config {
        print!("{}", Config::sample());
        return Ok(());
    }

    let rust_log = std::env::var("RUST_LOG").ok();
    set_console_logging(log_level(rust_log.as_deref(), args.verbose))?;
    info!("deluge_stats {} starting", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    info!(
        "Polling {} daemon(s) every {}s (request timeout {}s)",
        config.daemons.len(),
        config.poll_interval_seconds,
        config.request_timeout_seconds
    );

    if args.once {
        return run_once(&config, args.json).await;
    }

    let sink = SharedSink::new(LineProtocolSink::stdout());
    for (index, daemon) in config.daemons.iter().cloned().enumerate() {
        let sink = sink.clone();
        let poll_interval = config.poll_interval();
        let request_timeout = config.request_timeout();
        tokio::spawn(async move {
            if let Err(e) = run_target(daemon, poll_interval, request_timeout, sink).await {
                error!("Poller for daemon #{index} stopped: {e}");
            }
        });
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}
