#![forbid(unsafe_code)]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Environment-driven configuration for the bridge.
//!
//! Layout: `model.rs` (typed settings), `loader.rs` (environment parsing and
//! validation), `error.rs` (`ConfigError`).

pub mod error;
pub mod loader;
pub mod model;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    DEFAULT_RPC_TIMEOUT_SECS, DEFAULT_SERVER_ADDRESS, DEFAULT_SERVER_TIMEOUT_SECS, ENV_LOG_FORMAT,
    ENV_LOG_LEVEL, ENV_RPC_PASSWORD, ENV_RPC_TIMEOUT, ENV_RPC_URL, ENV_RPC_USERNAME,
    ENV_SERVER_ADDRESS, ENV_SERVER_TIMEOUT,
};
pub use model::{BasicAuth, BridgeConfig, LogSettings, RpcSettings, ServerSettings};
