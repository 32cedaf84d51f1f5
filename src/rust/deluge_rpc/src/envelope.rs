//! The JSON-RPC envelope spoken by Deluge's Web UI on `/json`.

use serde::{Deserialize, Serialize};

pub(crate) const AUTH_LOGIN: &str = "auth.login";
pub(crate) const WEB_UPDATE_UI: &str = "web.update_ui";

/// The protocol requires an id but never uses it to correlate anything.
pub(crate) const REQUEST_ID: i64 = 1;

/// Error code the Web UI returns when the session is missing or expired.
pub(crate) const UNAUTHENTICATED_CODE: i64 = 1;

/// Torrent keys requested from `web.update_ui`. Order matters to nobody
/// but is kept stable so request bodies are reproducible.
pub(crate) const TORRENT_KEYS: [&str; 9] = [
    "name",
    "total_size",
    "state",
    "progress",
    "ratio",
    "time_added",
    "tracker_host",
    "total_done",
    "total_uploaded",
];

#[derive(Serialize, Debug)]
pub(crate) struct RpcRequest<'a, P> {
    pub(crate) method: &'a str,
    pub(crate) params: P,
    pub(crate) id: i64,
}

impl<'a, P: Serialize> RpcRequest<'a, P> {
    pub(crate) fn new(method: &'a str, params: P) -> Self {
        Self {
            method,
            params,
            id: REQUEST_ID,
        }
    }
}

/// `auth.login` takes a single positional parameter: the password.
pub(crate) type LoginParams<'a> = [&'a str; 1];

/// `web.update_ui` takes `[keys, filter_dict]`. An empty filter dict
/// selects every torrent.
pub(crate) type UpdateUiParams = (
    &'static [&'static str],
    serde_json::Map<String, serde_json::Value>,
);

pub(crate) fn update_ui_params() -> UpdateUiParams {
    (&TORRENT_KEYS, serde_json::Map::new())
}

#[derive(Deserialize, Debug)]
pub(crate) struct RpcResponse<R> {
    pub(crate) result: Option<R>,
    pub(crate) error: Option<RpcError>,
    #[allow(dead_code)]
    pub(crate) id: Option<i64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct RpcError {
    pub(crate) code: i64,
    #[serde(default)]
    pub(crate) message: String,
}
