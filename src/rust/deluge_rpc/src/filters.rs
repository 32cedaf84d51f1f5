use serde::{Deserialize, Serialize};

/// Faceted torrent counts, as shown in the Web UI's sidebar.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Filters {
    pub state: Vec<FilterEntry>,
    pub tracker_host: Vec<FilterEntry>,
    pub owner: Vec<FilterEntry>,
    pub label: Vec<FilterEntry>,
}

/// A single facet value and the number of torrents carrying it.
///
/// On the wire this is a two-element array, `["Downloading", 4]`, not an
/// object. Going through a fixed-size tuple makes a short or long array a
/// decode error.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "(String, i64)", into = "(String, i64)")]
pub struct FilterEntry {
    pub key: String,
    pub count: i64,
}

impl From<(String, i64)> for FilterEntry {
    fn from((key, count): (String, i64)) -> Self {
        Self { key, count }
    }
}

impl From<FilterEntry> for (String, i64) {
    fn from(entry: FilterEntry) -> Self {
        (entry.key, entry.count)
    }
}
