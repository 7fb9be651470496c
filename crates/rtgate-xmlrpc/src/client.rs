//! HTTP transport for XML-RPC calls.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use rtgate_multicall::{RpcClient, RpcResult, RpcValue};
use tracing::debug;

use crate::codec::{decode_response, encode_call};
use crate::error::{XmlRpcError, XmlRpcResult};

const XML_CONTENT_TYPE: &str = "text/xml";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP basic-auth credentials for the XML-RPC endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Basic-auth user.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection settings for [`XmlRpcClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlRpcClientConfig {
    /// XML-RPC endpoint, usually ending in `/RPC2`.
    pub endpoint: Url,
    /// Basic-auth credentials, if the endpoint needs them.
    pub credentials: Option<Credentials>,
    /// Bound on one call including the response body.
    pub timeout: Duration,
}

impl XmlRpcClientConfig {
    /// Settings for `endpoint` without credentials and with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`XmlRpcError::InvalidUrl`] when `endpoint` does not parse.
    pub fn parse(endpoint: &str) -> XmlRpcResult<Self> {
        let url = endpoint
            .parse::<Url>()
            .map_err(|source| XmlRpcError::InvalidUrl {
                value: endpoint.to_string(),
                source,
            })?;
        Ok(Self {
            endpoint: url,
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Replace the credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Replace the call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// XML-RPC client posting `methodCall` documents over HTTP.
#[derive(Debug, Clone)]
pub struct XmlRpcClient {
    http: Client,
    config: XmlRpcClientConfig,
}

impl XmlRpcClient {
    /// Build a client with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`XmlRpcError::Http`] when the HTTP client cannot be constructed.
    pub fn new(config: XmlRpcClientConfig) -> XmlRpcResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| XmlRpcError::Http { source })?;
        Ok(Self { http, config })
    }

    /// Endpoint calls are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }

    /// Perform one call and return the decoded result.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-success HTTP statuses, malformed bodies
    /// and XML-RPC faults.
    pub async fn call_raw(&self, method: &str, params: &[RpcValue]) -> XmlRpcResult<RpcValue> {
        let mut request = self
            .http
            .post(self.config.endpoint.clone())
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .body(encode_call(method, params));
        if let Some(credentials) = &self.config.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request
            .send()
            .await
            .map_err(|source| XmlRpcError::Http { source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(XmlRpcError::HttpStatus {
                status: status.as_u16(),
            });
        }
        let body = response
            .text()
            .await
            .map_err(|source| XmlRpcError::Http { source })?;
        decode_response(&body)
    }
}

#[async_trait]
impl RpcClient for XmlRpcClient {
    async fn call(&self, method: &str, params: Vec<RpcValue>) -> RpcResult<RpcValue> {
        debug!(method, params = params.len(), "xml-rpc call");
        self.call_raw(method, &params).await.map_err(|error| {
            debug!(method, error = %error, "xml-rpc call failed");
            error.into_rpc_error(method)
        })
    }
}
