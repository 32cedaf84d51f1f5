//! Deluge metrics collector
//!
//! Polls Deluge Web UIs through [`deluge_rpc`] and turns each snapshot
//! into `deluge_overview` and `deluge_torrent` records.

pub mod collector;
mod errors;
pub mod poller;
pub mod records;
pub mod sink;

pub use collector::{Collector, PollReport};
pub use errors::{PollError, PollStage};
