use serde::{Deserialize, Deserializer, Serialize};

/// Per-torrent status, limited to the keys requested from `web.update_ui`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TorrentInfo {
    pub name: String,
    pub state: String,
    pub tracker_host: String,
    pub total_size: i64,
    pub total_done: i64,
    pub total_uploaded: i64,
    pub ratio: f64,
    pub progress: f64,
    #[serde(deserialize_with = "epoch_seconds")]
    pub time_added: i64,
}

/// Deluge 1.x reports `time_added` as whole seconds, 2.x as a float.
fn epoch_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Epoch {
        Whole(i64),
        Fractional(f64),
    }

    Ok(match Epoch::deserialize(deserializer)? {
        Epoch::Whole(secs) => secs,
        Epoch::Fractional(secs) => secs.trunc() as i64,
    })
}
