//! Typed configuration values.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use rtgate_telemetry::LogFormat;
use url::Url;

/// Complete bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Upstream endpoint.
    pub rpc: RpcSettings,
    /// HTTP listener.
    pub server: ServerSettings,
    /// Log filter and format.
    pub logging: LogSettings,
}

/// Upstream XML-RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcSettings {
    /// `http` or `https` URL of the XML-RPC mount.
    pub url: Url,
    /// Present only when both username and password were configured.
    pub auth: Option<BasicAuth>,
    /// Per-request timeout for calls to the endpoint.
    pub timeout: Duration,
}

/// HTTP basic-auth pair for the upstream endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    /// User name.
    pub username: String,
    /// Password; never logged.
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Listener settings for the JSON API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Listen address.
    pub address: SocketAddr,
    /// Upper bound on handling one request, including the upstream call.
    pub request_timeout: Duration,
}

/// Logging settings; `format` falls back to [`LogFormat::infer`] when unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Explicit output format, if configured.
    pub format: Option<LogFormat>,
}

impl LogSettings {
    /// Configured format, or the build-profile default.
    #[must_use]
    pub fn effective_format(&self) -> LogFormat {
        self.format.unwrap_or_else(LogFormat::infer)
    }
}
