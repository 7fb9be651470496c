#![forbid(unsafe_code)]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! XML-RPC client used to reach rTorrent's SCGI/HTTP bridge.
//!
//! The codec maps between XML-RPC documents and [`RpcValue`]; the client posts
//! encoded calls over HTTP and implements [`RpcClient`] for the multicall core.
//!
//! [`RpcValue`]: rtgate_multicall::RpcValue
//! [`RpcClient`]: rtgate_multicall::RpcClient

pub mod client;
pub mod codec;
pub mod error;

pub use client::{Credentials, XmlRpcClient, XmlRpcClientConfig};
pub use codec::{decode_response, encode_call};
pub use error::{XmlRpcError, XmlRpcResult};
