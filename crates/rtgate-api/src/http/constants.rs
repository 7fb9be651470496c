pub use rtgate_telemetry::REQUEST_ID_HEADER as HEADER_REQUEST_ID;

/// Upper bound for `.torrent` uploads on `/api/load`.
pub const MAX_UPLOAD_BYTES: usize = 10 << 20;

/// Multipart field carrying the metainfo file.
pub const UPLOAD_FIELD: &str = "file";

/// Degraded-component label for the upstream XML-RPC endpoint.
pub const COMPONENT_RTORRENT: &str = "rtorrent";

/// `status` value of successful responses.
pub const STATUS_OK: &str = "ok";
/// `status` value of the error envelope.
pub const STATUS_ERROR: &str = "error";
