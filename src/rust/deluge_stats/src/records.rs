//! Flattens a [`Snapshot`] into the two measurement shapes we emit.

use deluge_rpc::{Snapshot, Stats, TorrentInfo};
use serde::Serialize;
use std::collections::BTreeMap;

pub const OVERVIEW_MEASUREMENT: &str = "deluge_overview";
pub const TORRENT_MEASUREMENT: &str = "deluge_torrent";

/// A measured value. Integers and floats stay distinct so sinks that care
/// (InfluxDB does) can type them correctly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

pub type Fields = BTreeMap<String, FieldValue>;
pub type Tags = BTreeMap<String, String>;

/// One named set of fields and tags, ready for a sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub measurement: String,
    pub fields: Fields,
    pub tags: Tags,
}

fn fields<const N: usize>(pairs: [(&str, FieldValue); N]) -> Fields {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Daemon-wide counters. No tags.
pub fn overview_record(stats: &Stats) -> Record {
    Record {
        measurement: OVERVIEW_MEASUREMENT.to_string(),
        fields: fields([
            ("max_download", stats.max_download.into()),
            ("max_upload", stats.max_upload.into()),
            ("max_num_connections", stats.max_num_connections.into()),
            ("num_connections", stats.num_connections.into()),
            ("upload_rate", stats.upload_rate.into()),
            ("download_rate", stats.download_rate.into()),
            ("download_protocol_rate", stats.download_protocol_rate.into()),
            ("upload_protocol_rate", stats.upload_protocol_rate.into()),
            ("dht_nodes", stats.dht_nodes.into()),
        ]),
        tags: Tags::new(),
    }
}

/// Per-torrent progress, tagged by the dimensions users group on.
pub fn torrent_record(torrent: &TorrentInfo) -> Record {
    Record {
        measurement: TORRENT_MEASUREMENT.to_string(),
        fields: fields([
            ("ratio", torrent.ratio.into()),
            ("total_size", torrent.total_size.into()),
            ("total_uploaded", torrent.total_uploaded.into()),
            ("progress", torrent.progress.into()),
            ("total_done", torrent.total_done.into()),
        ]),
        tags: Tags::from([
            ("name".to_string(), torrent.name.clone()),
            ("state".to_string(), torrent.state.clone()),
            ("tracker_host".to_string(), torrent.tracker_host.clone()),
        ]),
    }
}

/// The overview record followed by one record per torrent, ordered by
/// torrent id so output is stable between polls.
pub fn snapshot_records(snapshot: &Snapshot) -> Vec<Record> {
    let mut ids: Vec<&String> = snapshot.torrents.keys().collect();
    ids.sort();

    let mut records = Vec::with_capacity(snapshot.torrents.len() + 1);
    records.push(overview_record(&snapshot.stats));
    records.extend(ids.into_iter().map(|id| torrent_record(&snapshot.torrents[id])));
    records
}
