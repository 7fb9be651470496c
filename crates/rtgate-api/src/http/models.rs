//! JSON bodies exchanged on `/api`.
//!
//! Every response carries `status` (`ok` or `error`) next to its payload.

use rtgate_multicall::{File, Peer, SystemFacts, Torrent, Tracker};
use serde::{Deserialize, Serialize};

use crate::http::constants::STATUS_OK;

/// Bare acknowledgement (`{"status":"ok","message":...}`), also used for errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// `ok` or `error`.
    pub status: String,
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Success acknowledgement.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            message: message.into(),
        }
    }
}

/// `GET /api/view/{view}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewResponse {
    /// Always `ok`.
    pub status: &'static str,
    /// Downloads in the view.
    pub torrents: Vec<Torrent>,
}

/// `GET /api/system` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemResponse {
    /// Always `ok`.
    pub status: &'static str,
    /// Client-wide facts.
    pub system: SystemFacts,
}

/// `GET /api/methods` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodsResponse {
    /// Always `ok`.
    pub status: &'static str,
    /// Method names reported by `system.listMethods`.
    pub methods: Vec<String>,
}

/// Body of the `files` torrent action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilesResponse {
    /// Always `ok`.
    pub status: &'static str,
    /// Files of the download.
    pub files: Vec<File>,
}

/// Body of the `peers` torrent action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeersResponse {
    /// Always `ok`.
    pub status: &'static str,
    /// Connected peers.
    pub peers: Vec<Peer>,
}

/// Body of the `trackers` torrent action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackersResponse {
    /// Always `ok`.
    pub status: &'static str,
    /// Attached trackers.
    pub trackers: Vec<Tracker>,
}

/// `POST /api/throttle` body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThrottleRequest {
    /// `up` or `down`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Cap in KiB/s; `0` removes it.
    pub kilobytes: i64,
}

/// `POST /api/torrent/{hash}/priority` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PriorityRequest {
    /// `0` (off) to `3` (high).
    pub priority: i64,
}
