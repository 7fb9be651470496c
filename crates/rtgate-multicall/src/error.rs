//! Error types for multicall decoding and rTorrent calls.
//!
//! # Design
//!
//! - Keep error messages constant; carry positions, selectors and wire types as fields.
//! - Separate the decoder's own failures from failures of the RPC collaborator.

use std::error::Error;

use thiserror::Error;

use crate::schema::ValueKind;

/// Failures raised while building calls or decoding multicall responses.
#[derive(Debug, Error)]
pub enum MulticallError {
    /// The outer response was not an array.
    #[error("multicall response is not an array")]
    ResponseNotArray {
        /// Wire type found instead.
        found: &'static str,
    },
    /// An outer response element was not an array.
    #[error("multicall row is not an array")]
    RowNotArray {
        /// Position of the offending row.
        row: usize,
        /// Wire type found instead.
        found: &'static str,
    },
    /// The selector list does not even cover the call-scoped arguments.
    #[error("selector list shorter than call-scoped arguments")]
    SelectorListTooShort {
        /// Number of leading call-scoped arguments declared by the schema.
        call_scoped: usize,
        /// Length of the supplied selector list.
        actual: usize,
    },
    /// A row carried a different number of values than selectors were requested.
    #[error("multicall row length does not match selector count")]
    RowLength {
        /// Position of the offending row.
        row: usize,
        /// Number of selectors requested.
        expected: usize,
        /// Number of values returned.
        actual: usize,
    },
    /// The system multicall returned a different number of results than calls made.
    #[error("system multicall result count does not match call count")]
    ResponseLength {
        /// Number of call descriptors sent.
        expected: usize,
        /// Number of results returned.
        actual: usize,
    },
    /// A system multicall result was not a single-element array.
    #[error("system multicall result is not a single-element array")]
    CallResultShape {
        /// Position of the offending result.
        index: usize,
        /// Method the result belongs to.
        method: String,
        /// Wire type found (or `array` when the length was wrong).
        found: &'static str,
        /// Element count when the result was an array.
        len: Option<usize>,
    },
    /// A single call inside a system multicall faulted.
    #[error("system multicall entry returned a fault")]
    CallFault {
        /// Position of the faulted call.
        index: usize,
        /// Method that faulted.
        method: String,
        /// Fault code reported by the remote.
        code: i64,
        /// Fault string reported by the remote.
        message: String,
    },
    /// A present value could not be converted into the field's declared type.
    #[error("value cannot be coerced into field type")]
    Coercion {
        /// Selector (or method name) of the field.
        selector: String,
        /// Declared field type.
        expected: ValueKind,
        /// Wire type received.
        found: &'static str,
    },
    /// Call-scoped argument count differs from what the schema declares.
    #[error("call-scoped argument count mismatch")]
    ScopeArity {
        /// Count declared by the schema.
        expected: usize,
        /// Count supplied by the caller.
        actual: usize,
    },
    /// A selector was requested twice in one call.
    #[error("selector requested more than once")]
    DuplicateSelector {
        /// Repeated selector.
        selector: String,
    },
}

impl MulticallError {
    /// Whether the failure stems from the response shape rather than a value.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::ResponseNotArray { .. }
                | Self::RowNotArray { .. }
                | Self::SelectorListTooShort { .. }
                | Self::RowLength { .. }
                | Self::ResponseLength { .. }
                | Self::CallResultShape { .. }
        )
    }
}

/// Convenience alias for decoder results.
pub type MulticallResult<T> = Result<T, MulticallError>;

/// Failures reported by an [`RpcClient`](crate::service::RpcClient) implementation.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The request never produced a usable response.
    #[error("rpc transport failed")]
    Transport {
        /// Remote method being invoked.
        method: String,
        /// Underlying transport failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The remote answered with an XML-RPC fault.
    #[error("rpc call returned a fault")]
    Fault {
        /// Remote method being invoked.
        method: String,
        /// Fault code.
        code: i64,
        /// Fault string.
        message: String,
    },
    /// The response body could not be parsed.
    #[error("rpc response was malformed")]
    MalformedResponse {
        /// Remote method being invoked.
        method: String,
        /// Underlying parse failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

/// Convenience alias for RPC client results.
pub type RpcResult<T> = Result<T, RpcError>;

/// Failures surfaced by the [`Rtorrent`](crate::service::Rtorrent) facade.
#[derive(Debug, Error)]
pub enum RtorrentError {
    /// The remote call failed.
    #[error("rtorrent call failed")]
    Call {
        /// Operation identifier.
        operation: &'static str,
        /// Source RPC failure.
        #[source]
        source: RpcError,
    },
    /// The remote answered but the multicall result could not be decoded.
    #[error("rtorrent response could not be decoded")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Source decoder failure.
        #[source]
        source: MulticallError,
    },
    /// A non-multicall result had an unexpected wire type.
    #[error("rtorrent returned an unexpected result")]
    UnexpectedResult {
        /// Operation identifier.
        operation: &'static str,
        /// Wire type received.
        found: &'static str,
    },
    /// An argument was rejected before any call was made.
    #[error("invalid argument")]
    InvalidArgument {
        /// Argument name.
        field: &'static str,
        /// Machine-readable reason.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl RtorrentError {
    pub(crate) const fn call(operation: &'static str, source: RpcError) -> Self {
        Self::Call { operation, source }
    }

    pub(crate) const fn decode(operation: &'static str, source: MulticallError) -> Self {
        Self::Decode { operation, source }
    }

    /// Facade operation that failed, when a call was attempted.
    #[must_use]
    pub const fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Call { operation, .. }
            | Self::Decode { operation, .. }
            | Self::UnexpectedResult { operation, .. } => Some(*operation),
            Self::InvalidArgument { .. } => None,
        }
    }
}

/// Convenience alias for facade results.
pub type RtorrentResult<T> = Result<T, RtorrentError>;
