use crate::filters::Filters;
use crate::torrent::TorrentInfo;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// One complete read of daemon state, as returned by `web.update_ui`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub connected: bool,
    pub stats: Stats,
    /// Keyed by torrent id (info hash).
    #[serde(default, deserialize_with = "null_as_default")]
    pub torrents: HashMap<String, TorrentInfo>,
    /// Decoded so the payload is validated, but not emitted anywhere.
    #[serde(default, deserialize_with = "null_as_default")]
    pub filters: Filters,
}

/// Session-wide counters. A Web UI that has lost its daemon only reports
/// the configured limits, so every counter falls back to zero.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Stats {
    pub max_download: f64,
    pub max_upload: f64,
    pub max_num_connections: i64,
    pub num_connections: i64,
    pub upload_rate: f64,
    pub download_rate: f64,
    pub download_protocol_rate: f64,
    pub upload_protocol_rate: f64,
    pub dht_nodes: i64,
    pub has_incoming_connections: Option<bool>,
    pub free_space: Option<i64>,
    pub external_ip: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
