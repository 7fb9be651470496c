#![forbid(unsafe_code)]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Typed access to rTorrent multicall responses.
//!
//! rTorrent answers `d.multicall2`, `f.multicall`, `p.multicall`, `t.multicall`
//! and `system.multicall` with untyped nested arrays whose positions mirror the
//! selector list sent with the call. This crate owns the selector schemas, the
//! builders that keep the call arguments and the decoder in lock-step, and the
//! positional decoder that turns the raw arrays back into records.

pub mod call;
pub mod decode;
pub mod error;
pub mod model;
pub mod schema;
pub mod service;
pub mod value;

pub use call::{EntityCall, PerTorrent, SystemCall, SystemMulticall};
pub use decode::{decode_calls, decode_entities, decode_system_facts};
pub use error::{MulticallError, MulticallResult, RpcError, RpcResult, RtorrentError, RtorrentResult};
pub use model::{File, Peer, SystemFacts, Torrent, Tracker};
pub use schema::{EntityRecord, Field, Record, Schema, Setter, ValueKind};
pub use service::{RpcClient, Rtorrent, ThrottleDirection};
pub use value::RpcValue;
