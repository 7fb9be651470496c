//! # Design
//!
//! - Centralize application-level errors for bootstrap.
//! - Keep error messages constant while carrying the failed operation as a field.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: rtgate_config::ConfigError,
    },
    /// The XML-RPC client could not be built.
    #[error("rpc client operation failed")]
    RpcClient {
        /// Operation identifier.
        operation: &'static str,
        /// Source client error.
        source: rtgate_xmlrpc::XmlRpcError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: rtgate_telemetry::TelemetryError,
    },
    /// API server operations failed.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source API server error.
        source: rtgate_api::ApiServerError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: rtgate_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn rpc_client(
        operation: &'static str,
        source: rtgate_xmlrpc::XmlRpcError,
    ) -> Self {
        Self::RpcClient { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: rtgate_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn api_server(
        operation: &'static str,
        source: rtgate_api::ApiServerError,
    ) -> Self {
        Self::ApiServer { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "bridge_config.from_env",
            rtgate_config::ConfigError::MissingEnv {
                name: rtgate_config::ENV_RPC_URL,
            },
        );
        assert!(matches!(
            config,
            AppError::Config {
                operation: "bridge_config.from_env",
                ..
            }
        ));
        assert_eq!(config.to_string(), "configuration operation failed");
        assert!(config.source().is_some());

        let client = AppError::rpc_client(
            "xmlrpc_client.new",
            rtgate_xmlrpc::XmlRpcError::HttpStatus { status: 502 },
        );
        assert!(matches!(client, AppError::RpcClient { .. }));

        let telemetry = AppError::telemetry(
            "telemetry.init",
            rtgate_telemetry::TelemetryError::UnknownLogFormat {
                value: "xml".to_string(),
            },
        );
        assert!(matches!(telemetry, AppError::Telemetry { .. }));

        let api = AppError::api_server(
            "api_server.serve",
            rtgate_api::ApiServerError::Serve {
                source: io::Error::other("io"),
            },
        );
        assert!(matches!(api, AppError::ApiServer { .. }));
        assert!(api.source().is_some());
    }
}
