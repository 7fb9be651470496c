#![forbid(unsafe_code)]

//! Binary entrypoint for the rtgate bridge.

use rtgate_app::{AppResult, run_app};

/// Loads configuration from the environment and serves until the listener stops.
#[tokio::main]
async fn main() -> AppResult<()> {
    run_app().await
}
