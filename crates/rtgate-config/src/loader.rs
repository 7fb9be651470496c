//! Reading [`BridgeConfig`] from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use rtgate_telemetry::{DEFAULT_LOG_LEVEL, LogFormat};
use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{BasicAuth, BridgeConfig, LogSettings, RpcSettings, ServerSettings};

/// XML-RPC endpoint URL (required).
pub const ENV_RPC_URL: &str = "XMLRPC_URL";
/// Basic-auth user; requires the password too.
pub const ENV_RPC_USERNAME: &str = "XMLRPC_USERNAME";
/// Basic-auth password; requires the user too.
pub const ENV_RPC_PASSWORD: &str = "XMLRPC_PASSWORD";
/// Per-call RPC timeout in seconds.
pub const ENV_RPC_TIMEOUT: &str = "XMLRPC_TIMEOUT_SECS";
/// Listen address for the HTTP API.
pub const ENV_SERVER_ADDRESS: &str = "SERVER_ADDRESS";
/// Per-request HTTP timeout in seconds.
pub const ENV_SERVER_TIMEOUT: &str = "SERVER_TIMEOUT_SECS";
/// Default log filter when `RUST_LOG` is unset.
pub const ENV_LOG_LEVEL: &str = "RTGATE_LOG_LEVEL";
/// `json` or `pretty`.
pub const ENV_LOG_FORMAT: &str = "RTGATE_LOG_FORMAT";

/// Used when the RPC timeout is unset.
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;
/// Used when the listen address is unset.
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
/// Used when the HTTP timeout is unset.
pub const DEFAULT_SERVER_TIMEOUT_SECS: u64 = 5;

impl BridgeConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`BridgeConfig::from_lookup`].
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] when `XMLRPC_URL` is unset and
    /// [`ConfigError::InvalidField`] for any value that fails to parse, for a
    /// non-http(s) URL, for a zero timeout and for a username without a
    /// password (or the reverse).
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let url = read(ENV_RPC_URL).ok_or(ConfigError::MissingEnv { name: ENV_RPC_URL })?;
        let rpc = RpcSettings {
            url: parse_endpoint(&url)?,
            auth: parse_auth(read(ENV_RPC_USERNAME), read(ENV_RPC_PASSWORD))?,
            timeout: parse_timeout(
                ENV_RPC_TIMEOUT,
                read(ENV_RPC_TIMEOUT),
                DEFAULT_RPC_TIMEOUT_SECS,
            )?,
        };

        let address =
            read(ENV_SERVER_ADDRESS).unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string());
        let server = ServerSettings {
            address: address.parse::<SocketAddr>().map_err(|_| {
                ConfigError::invalid(ENV_SERVER_ADDRESS, &address, "invalid_socket_address")
            })?,
            request_timeout: parse_timeout(
                ENV_SERVER_TIMEOUT,
                read(ENV_SERVER_TIMEOUT),
                DEFAULT_SERVER_TIMEOUT_SECS,
            )?,
        };

        let format = read(ENV_LOG_FORMAT)
            .map(|value| {
                value.parse::<LogFormat>().map_err(|_| {
                    ConfigError::invalid(ENV_LOG_FORMAT, &value, "unknown_log_format")
                })
            })
            .transpose()?;
        let logging = LogSettings {
            level: read(ENV_LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            format,
        };

        Ok(Self {
            rpc,
            server,
            logging,
        })
    }
}

fn parse_endpoint(value: &str) -> ConfigResult<Url> {
    let url =
        Url::parse(value).map_err(|_| ConfigError::invalid(ENV_RPC_URL, value, "invalid_url"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::invalid(ENV_RPC_URL, value, "unsupported_scheme")),
    }
}

fn parse_auth(
    username: Option<String>,
    password: Option<String>,
) -> ConfigResult<Option<BasicAuth>> {
    match (username, password) {
        (Some(username), Some(password)) => Ok(Some(BasicAuth { username, password })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::InvalidField {
            field: ENV_RPC_PASSWORD,
            value: None,
            reason: "required_with_username",
        }),
        (None, Some(_)) => Err(ConfigError::InvalidField {
            field: ENV_RPC_USERNAME,
            value: None,
            reason: "required_with_password",
        }),
    }
}

fn parse_timeout(
    field: &'static str,
    value: Option<String>,
    default: u64,
) -> ConfigResult<Duration> {
    let Some(value) = value else {
        return Ok(Duration::from_secs(default));
    };
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::invalid(field, &value, "must_be_positive_integer")),
    }
}
