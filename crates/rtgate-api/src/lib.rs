#![forbid(unsafe_code)]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! JSON HTTP API over an rTorrent XML-RPC endpoint.
//!
//! Layout: `error.rs` (listener failures), `state.rs` (shared handler state
//! and health tracking), `http/` (router, handlers, error envelope, metrics
//! middleware).

pub mod error;
pub mod http;
pub mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::{ApiServer, ServerOptions};
pub use state::ApiState;
