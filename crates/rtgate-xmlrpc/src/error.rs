//! Error types for the XML-RPC codec and transport.

use rtgate_multicall::RpcError;
use thiserror::Error;

/// Result alias for XML-RPC operations.
pub type XmlRpcResult<T> = Result<T, XmlRpcError>;

/// Failures raised while encoding, sending or decoding XML-RPC messages.
#[derive(Debug, Error)]
pub enum XmlRpcError {
    /// The response body was not well-formed XML.
    #[error("xml parse failed")]
    Xml {
        /// Underlying parser error.
        #[from]
        source: quick_xml::Error,
    },
    /// The document ended without a root element or with unclosed elements.
    #[error("xml document incomplete")]
    Incomplete {
        /// Element being read when input ran out.
        context: &'static str,
    },
    /// An element appeared where the XML-RPC grammar does not allow it.
    #[error("unexpected xml-rpc element")]
    UnexpectedElement {
        /// Element required at this position.
        expected: &'static str,
        /// Element found instead.
        found: String,
    },
    /// A scalar body could not be parsed as its declared type.
    #[error("invalid xml-rpc scalar")]
    InvalidScalar {
        /// Declared scalar type.
        kind: &'static str,
        /// Raw text of the scalar.
        value: String,
    },
    /// A `base64` body was not valid base64.
    #[error("invalid base64 payload")]
    InvalidBase64 {
        /// Underlying decode error.
        #[from]
        source: base64::DecodeError,
    },
    /// The remote returned a `<fault>`.
    #[error("xml-rpc fault")]
    Fault {
        /// `faultCode` member.
        code: i64,
        /// `faultString` member.
        message: String,
    },
    /// The endpoint URL could not be parsed.
    #[error("invalid endpoint url")]
    InvalidUrl {
        /// Offending URL text.
        value: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
    /// The HTTP exchange failed.
    #[error("http request failed")]
    Http {
        /// Underlying client error.
        source: reqwest::Error,
    },
    /// The endpoint answered with a non-success status.
    #[error("http response status error")]
    HttpStatus {
        /// Status code returned.
        status: u16,
    },
}

impl XmlRpcError {
    /// Translate into the multicall core's transport error for `method`.
    #[must_use]
    pub fn into_rpc_error(self, method: &str) -> RpcError {
        let method = method.to_string();
        match self {
            Self::Fault { code, message } => RpcError::Fault {
                method,
                code,
                message,
            },
            error @ (Self::Http { .. } | Self::HttpStatus { .. } | Self::InvalidUrl { .. }) => {
                RpcError::Transport {
                    method,
                    source: Box::new(error),
                }
            }
            error => RpcError::MalformedResponse {
                method,
                source: Box::new(error),
            },
        }
    }
}
