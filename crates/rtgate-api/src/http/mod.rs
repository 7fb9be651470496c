//! HTTP surface modules.

/// Shared constants for the HTTP layer.
pub mod constants;
/// Error envelope and status mapping.
pub mod errors;
/// rTorrent-facing handlers under `/api`.
pub mod handlers;
/// Health and metrics endpoints.
pub mod health;
/// Request and response bodies.
pub mod models;
/// Router construction and server host.
pub mod router;
/// Metrics middleware for HTTP requests.
pub mod telemetry;
