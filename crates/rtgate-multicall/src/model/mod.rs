//! Records decoded from rTorrent multicalls and their selector schemas.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::schema::{EntityRecord, Field, Record, Schema};

/// Leading positional arguments of every `*.multicall` entity call.
pub const ENTITY_CALL_SCOPED: usize = 2;

/// Download item as reported by `d.multicall2`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Torrent {
    /// Info-hash, upper-case hex.
    pub hash: String,
    /// Display name.
    pub name: String,
    /// Total payload size in bytes.
    pub size_bytes: i64,
    /// Bytes downloaded and verified.
    pub completed_bytes: i64,
    /// Current upload rate, bytes per second.
    pub upload_rate: i64,
    /// Bytes uploaded over the lifetime of the item.
    pub upload_total: i64,
    /// Current download rate, bytes per second.
    pub download_rate: i64,
    /// Bytes downloaded over the lifetime of the item.
    pub download_total: i64,
    /// Last tracker or client message.
    pub message: String,
    /// Name of the base file or directory.
    pub base_filename: String,
    /// Absolute path of the payload.
    pub base_path: String,
    /// `1` when the item is active.
    pub is_active: i64,
    /// `1` when the item is open.
    pub is_open: i64,
    /// `1` while a hash check runs.
    pub is_hashing: i64,
    /// Connected peers still downloading.
    pub leechers: i64,
    /// Connected peers with the complete payload.
    pub seeders: i64,
    /// `1` when started, `0` when stopped.
    pub state: i64,
    /// Unix time of the last state change.
    pub state_changed: i64,
    /// Number of state transitions.
    pub state_counter: i64,
    /// Download priority, `0` (off) to `3` (high).
    pub priority: i64,
    /// User slot `custom1`, often the label.
    pub custom1: String,
    /// User slot `custom2`.
    pub custom2: String,
    /// User slot `custom3`.
    pub custom3: String,
    /// User slot `custom4`.
    pub custom4: String,
    /// User slot `custom5`.
    pub custom5: String,
}

/// File entry of a download, from `f.multicall`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Path relative to the download base.
    pub path: String,
    /// File size in bytes.
    pub size: i64,
    /// File size in chunks.
    pub size_chunks: i64,
    /// Chunks already downloaded.
    pub completed_chunks: i64,
    /// Absolute path fixed when the file was opened.
    pub frozen_path: String,
    /// File priority, `0` (off) to `2` (high).
    pub priority: i64,
    /// `1` once the file exists on disk.
    pub is_created: i64,
    /// `1` while the file is open.
    pub is_open: i64,
}

/// Connected peer of a download, from `p.multicall`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Peer identifier, hex encoded.
    pub id: String,
    /// Remote IP address.
    pub address: String,
    /// Remote port.
    pub port: i64,
    /// `1` when the peer is banned.
    pub banned: i64,
    /// Reported client name and version.
    pub client_version: String,
    /// Share of the payload the peer holds.
    pub completed_percent: i64,
    /// `1` for encrypted connections.
    pub is_encrypted: i64,
    /// `1` when the peer connected to us.
    pub is_incoming: i64,
    /// `1` for obfuscated handshakes.
    pub is_obfuscated: i64,
    /// Rate the peer downloads from us.
    pub down_rate: i64,
    /// Bytes the peer downloaded from us.
    pub down_total: i64,
    /// Rate we download from the peer.
    pub up_rate: i64,
    /// Bytes we downloaded from the peer.
    pub up_total: i64,
}

/// Tracker attached to a download, from `t.multicall`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
    /// Tracker identifier.
    pub tracker_id: String,
    /// Unix time of the last announce.
    pub activity_time_last: i64,
    /// Unix time of the next announce.
    pub activity_time_next: i64,
    /// `1` when the tracker supports scrapes.
    pub can_scrape: i64,
    /// `1` when the tracker can be used.
    pub is_usable: i64,
    /// `1` when the tracker is enabled.
    pub is_enabled: i64,
    /// Consecutive failed announces.
    pub failed_counter: i64,
    /// Unix time of the last failure.
    pub failed_time_last: i64,
    /// Unix time of the next retry after a failure.
    pub failed_time_next: i64,
    /// Last announce event sent.
    pub latest_event: String,
    /// `1` while a request is in flight.
    pub is_busy: i64,
    /// `1` while the connection is open.
    pub is_open: i64,
    /// Tracker type: `1` http, `2` udp, `3` dht.
    #[serde(rename = "type")]
    pub kind: i64,
    /// Announce URL.
    pub url: String,
}

/// Client-wide facts collected through `system.multicall`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemFacts {
    /// XML-RPC API version.
    pub api_version: String,
    /// rTorrent version.
    pub client_version: String,
    /// libtorrent version.
    pub library_version: String,
    /// Host running rTorrent.
    pub hostname: String,
    /// Process id of rTorrent.
    pub pid: i64,
    /// Client clock as Unix time.
    pub time_seconds: i64,
    /// Bytes downloaded since start.
    pub throttle_global_down_total: i64,
    /// Bytes uploaded since start.
    pub throttle_global_up_total: i64,
    /// Current global download rate.
    pub throttle_global_down_rate: i64,
    /// Current global upload rate.
    pub throttle_global_up_rate: i64,
    /// Global download limit, `0` for unlimited.
    pub throttle_global_down_max_rate: i64,
    /// Global upload limit, `0` for unlimited.
    pub throttle_global_up_max_rate: i64,
}

static TORRENT_SCHEMA: Lazy<Schema<Torrent>> = Lazy::new(|| {
    type F = Field<Torrent>;
    Schema::new(
        "torrent",
        ENTITY_CALL_SCOPED,
        vec![
            F::string("d.hash=", "hash", |t, v| t.hash = v),
            F::string("d.name=", "name", |t, v| t.name = v),
            F::int("d.size_bytes=", "size_bytes", |t, v| t.size_bytes = v),
            F::int("d.completed_bytes=", "completed_bytes", |t, v| {
                t.completed_bytes = v;
            }),
            F::int("d.up.rate=", "upload_rate", |t, v| t.upload_rate = v),
            F::int("d.up.total=", "upload_total", |t, v| t.upload_total = v),
            F::int("d.down.rate=", "download_rate", |t, v| t.download_rate = v),
            F::int("d.down.total=", "download_total", |t, v| {
                t.download_total = v;
            }),
            F::string("d.message=", "message", |t, v| t.message = v),
            F::string("d.base_filename=", "base_filename", |t, v| {
                t.base_filename = v;
            }),
            F::string("d.base_path=", "base_path", |t, v| t.base_path = v),
            F::int("d.is_active=", "is_active", |t, v| t.is_active = v),
            F::int("d.is_open=", "is_open", |t, v| t.is_open = v),
            F::int("d.is_hash_checking=", "is_hashing", |t, v| t.is_hashing = v),
            F::int("d.peers_accounted=", "leechers", |t, v| t.leechers = v),
            F::int("d.peers_complete=", "seeders", |t, v| t.seeders = v),
            F::int("d.state=", "state", |t, v| t.state = v),
            F::int("d.state_changed=", "state_changed", |t, v| t.state_changed = v),
            F::int("d.state_counter=", "state_counter", |t, v| t.state_counter = v),
            F::int("d.priority=", "priority", |t, v| t.priority = v),
            F::string("d.custom1=", "custom1", |t, v| t.custom1 = v),
            F::string("d.custom2=", "custom2", |t, v| t.custom2 = v),
            F::string("d.custom3=", "custom3", |t, v| t.custom3 = v),
            F::string("d.custom4=", "custom4", |t, v| t.custom4 = v),
            F::string("d.custom5=", "custom5", |t, v| t.custom5 = v),
        ],
    )
});

static FILE_SCHEMA: Lazy<Schema<File>> = Lazy::new(|| {
    type F = Field<File>;
    Schema::new(
        "file",
        ENTITY_CALL_SCOPED,
        vec![
            F::string("f.path=", "path", |f, v| f.path = v),
            F::int("f.size_bytes=", "size", |f, v| f.size = v),
            F::int("f.size_chunks=", "size_chunks", |f, v| f.size_chunks = v),
            F::int("f.completed_chunks=", "completed_chunks", |f, v| {
                f.completed_chunks = v;
            }),
            F::string("f.frozen_path=", "frozen_path", |f, v| f.frozen_path = v),
            F::int("f.priority=", "priority", |f, v| f.priority = v),
            F::int("f.is_created=", "is_created", |f, v| f.is_created = v),
            F::int("f.is_open=", "is_open", |f, v| f.is_open = v),
        ],
    )
});

static PEER_SCHEMA: Lazy<Schema<Peer>> = Lazy::new(|| {
    type F = Field<Peer>;
    Schema::new(
        "peer",
        ENTITY_CALL_SCOPED,
        vec![
            F::string("p.id=", "id", |p, v| p.id = v),
            F::string("p.address=", "address", |p, v| p.address = v),
            F::int("p.port=", "port", |p, v| p.port = v),
            F::int("p.banned=", "banned", |p, v| p.banned = v),
            F::string("p.client_version=", "client_version", |p, v| {
                p.client_version = v;
            }),
            F::int("p.completed_percent=", "completed_percent", |p, v| {
                p.completed_percent = v;
            }),
            F::int("p.is_encrypted=", "is_encrypted", |p, v| p.is_encrypted = v),
            F::int("p.is_incoming=", "is_incoming", |p, v| p.is_incoming = v),
            F::int("p.is_obfuscated=", "is_obfuscated", |p, v| p.is_obfuscated = v),
            F::int("p.peer_rate=", "down_rate", |p, v| p.down_rate = v),
            F::int("p.peer_total=", "down_total", |p, v| p.down_total = v),
            F::int("p.up_rate=", "up_rate", |p, v| p.up_rate = v),
            F::int("p.up_total=", "up_total", |p, v| p.up_total = v),
        ],
    )
});

static TRACKER_SCHEMA: Lazy<Schema<Tracker>> = Lazy::new(|| {
    type F = Field<Tracker>;
    Schema::new(
        "tracker",
        ENTITY_CALL_SCOPED,
        vec![
            F::string("t.id=", "tracker_id", |t, v| t.tracker_id = v),
            F::int("t.type=", "type", |t, v| t.kind = v),
            F::string("t.url=", "url", |t, v| t.url = v),
            F::int("t.activity_time_last=", "activity_time_last", |t, v| {
                t.activity_time_last = v;
            }),
            F::int("t.activity_time_next=", "activity_time_next", |t, v| {
                t.activity_time_next = v;
            }),
            F::int("t.can_scrape=", "can_scrape", |t, v| t.can_scrape = v),
            F::int("t.is_usable=", "is_usable", |t, v| t.is_usable = v),
            F::int("t.is_enabled=", "is_enabled", |t, v| t.is_enabled = v),
            F::int("t.failed_counter=", "failed_counter", |t, v| {
                t.failed_counter = v;
            }),
            F::int("t.failed_time_last=", "failed_time_last", |t, v| {
                t.failed_time_last = v;
            }),
            F::int("t.failed_time_next=", "failed_time_next", |t, v| {
                t.failed_time_next = v;
            }),
            F::string("t.latest_event=", "latest_event", |t, v| t.latest_event = v),
            F::int("t.is_busy=", "is_busy", |t, v| t.is_busy = v),
            F::int("t.is_open=", "is_open", |t, v| t.is_open = v),
        ],
    )
});

static SYSTEM_SCHEMA: Lazy<Schema<SystemFacts>> = Lazy::new(|| {
    type F = Field<SystemFacts>;
    Schema::new(
        "system",
        0,
        vec![
            F::string("system.hostname", "hostname", |s, v| s.hostname = v),
            F::int("system.pid", "pid", |s, v| s.pid = v),
            F::int("system.time_seconds", "time_seconds", |s, v| s.time_seconds = v),
            F::string("system.api_version", "api_version", |s, v| s.api_version = v),
            F::string("system.client_version", "client_version", |s, v| {
                s.client_version = v;
            }),
            F::string("system.library_version", "library_version", |s, v| {
                s.library_version = v;
            }),
            F::int(
                "throttle.global_down.total",
                "throttle_global_down_total",
                |s, v| s.throttle_global_down_total = v,
            ),
            F::int(
                "throttle.global_up.total",
                "throttle_global_up_total",
                |s, v| s.throttle_global_up_total = v,
            ),
            F::int(
                "throttle.global_down.rate",
                "throttle_global_down_rate",
                |s, v| s.throttle_global_down_rate = v,
            ),
            F::int(
                "throttle.global_up.rate",
                "throttle_global_up_rate",
                |s, v| s.throttle_global_up_rate = v,
            ),
            F::int(
                "throttle.global_down.max_rate",
                "throttle_global_down_max_rate",
                |s, v| s.throttle_global_down_max_rate = v,
            ),
            F::int(
                "throttle.global_up.max_rate",
                "throttle_global_up_max_rate",
                |s, v| s.throttle_global_up_max_rate = v,
            ),
        ],
    )
});

impl Record for Torrent {
    fn schema() -> &'static Schema<Self> {
        &TORRENT_SCHEMA
    }
}

impl EntityRecord for Torrent {
    const MULTICALL_METHOD: &'static str = "d.multicall2";
}

impl Record for File {
    fn schema() -> &'static Schema<Self> {
        &FILE_SCHEMA
    }
}

impl EntityRecord for File {
    const MULTICALL_METHOD: &'static str = "f.multicall";
}

impl Record for Peer {
    fn schema() -> &'static Schema<Self> {
        &PEER_SCHEMA
    }
}

impl EntityRecord for Peer {
    const MULTICALL_METHOD: &'static str = "p.multicall";
}

impl Record for Tracker {
    fn schema() -> &'static Schema<Self> {
        &TRACKER_SCHEMA
    }
}

impl EntityRecord for Tracker {
    const MULTICALL_METHOD: &'static str = "t.multicall";
}

impl Record for SystemFacts {
    fn schema() -> &'static Schema<Self> {
        &SYSTEM_SCHEMA
    }
}
