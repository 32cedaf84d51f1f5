//! Deluge Web UI JSON-RPC client
//!
//! Strong-typed access to the `/json` endpoint of Deluge's Web UI: cookie
//! based login (`auth.login`) and the `web.update_ui` snapshot used by the
//! metrics collector.

mod client; // Session handling and the two RPC calls
mod envelope; // Request/response envelope and method names
mod errors;
mod filters; // Sidebar filter counts, with their pair encoding
mod rest; // HTTP transport helpers
mod snapshot;
mod torrent;

pub use client::{DelugeApi, DelugeClient};
pub use errors::{AuthError, ClientError, FetchError, TransportError};
pub use filters::{FilterEntry, Filters};
pub use snapshot::{Snapshot, Stats};
pub use torrent::TorrentInfo;
