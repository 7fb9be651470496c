use std::sync::Arc;

use rtgate_api::{ApiServer, ServerOptions};
use rtgate_config::{BridgeConfig, RpcSettings};
use rtgate_multicall::Rtorrent;
use rtgate_telemetry::{GlobalContextGuard, LoggingConfig, Metrics, init_logging};
use rtgate_xmlrpc::{Credentials, XmlRpcClient, XmlRpcClientConfig};
use tracing::{error, info};
use url::Url;

use crate::error::{AppError, AppResult};

/// Dependencies required to bootstrap the bridge.
pub(crate) struct BootstrapDependencies {
    config: BridgeConfig,
    client: Arc<XmlRpcClient>,
    telemetry: Metrics,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let config = BridgeConfig::from_env()
            .map_err(|err| AppError::config("bridge_config.from_env", err))?;
        Self::from_config(config)
    }

    pub(crate) fn from_config(config: BridgeConfig) -> AppResult<Self> {
        let client = XmlRpcClient::new(client_config(&config.rpc))
            .map_err(|err| AppError::rpc_client("xmlrpc_client.new", err))?;
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        Ok(Self {
            config,
            client: Arc::new(client),
            telemetry,
        })
    }
}

/// Entry point for the rtgate boot sequence.
///
/// # Errors
///
/// Returns an error if configuration is invalid, logging cannot be installed,
/// or the listener fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies).await
}

/// Boot sequence that relies entirely on injected dependencies.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let logging = &dependencies.config.logging;
    init_logging(&LoggingConfig {
        level: &logging.level,
        format: logging.effective_format(),
        ..LoggingConfig::default()
    })
    .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new(display_endpoint(&dependencies.config.rpc.url));

    info!("rtgate bootstrap starting");
    let result = launch(dependencies).await;
    if let Err(err) = &result {
        error!(error = %err, "rtgate stopped with an error");
    }
    result
}

async fn launch(dependencies: BootstrapDependencies) -> AppResult<()> {
    let BootstrapDependencies {
        config,
        client,
        telemetry,
    } = dependencies;

    let rtorrent = Rtorrent::new(client);
    let api = ApiServer::new(
        rtorrent,
        telemetry,
        ServerOptions {
            request_timeout: config.server.request_timeout,
        },
    );

    let addr = config.server.address;
    info!(
        addr = %addr,
        authenticated = config.rpc.auth.is_some(),
        rpc_timeout_secs = config.rpc.timeout.as_secs(),
        "Launching API listener"
    );
    api.serve(addr)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))
}

fn client_config(rpc: &RpcSettings) -> XmlRpcClientConfig {
    XmlRpcClientConfig {
        endpoint: rpc.url.clone(),
        credentials: rpc.auth.as_ref().map(|auth| Credentials {
            username: auth.username.clone(),
            password: auth.password.clone(),
        }),
        timeout: rpc.timeout,
    }
}

/// Endpoint as logged: userinfo stripped.
fn display_endpoint(url: &Url) -> String {
    let mut shown = url.clone();
    // Only URLs without an authority reject these, and they carry no userinfo.
    if shown.set_username("").is_err() || shown.set_password(None).is_err() {
        return url.to_string();
    }
    shown.to_string()
}
