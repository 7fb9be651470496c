//! Error envelope for `/api` responses.

use std::error::Error;
use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rtgate_multicall::{RpcError, RtorrentError};

use crate::http::constants::STATUS_ERROR;
use crate::http::models::MessageResponse;

/// Failure rendered as `{"status":"error","message":...}`.
#[derive(Debug)]
pub struct ApiError {
    pub(crate) status: StatusCode,
    message: String,
}

impl ApiError {
    const fn new(status: StatusCode, message: String) -> Self {
        Self { status, message }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into())
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message.into())
    }

    pub(crate) fn request_timeout(limit: Duration) -> Self {
        Self::new(
            StatusCode::REQUEST_TIMEOUT,
            format!("request exceeded {}ms", limit.as_millis()),
        )
    }

    /// Map a facade failure onto a status.
    ///
    /// Rejected arguments are always 400 and undecodable responses always
    /// 500; a failed call uses `call_status`, which differs per route.
    pub(crate) fn from_rtorrent(error: &RtorrentError, call_status: StatusCode) -> Self {
        let status = match error {
            RtorrentError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            RtorrentError::Decode { .. } | RtorrentError::UnexpectedResult { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RtorrentError::Call { .. } => call_status,
        };
        Self::new(status, describe(error))
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Message placed in the envelope.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = MessageResponse {
            status: STATUS_ERROR.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Human-readable message for a facade failure, including the fault string
/// or the source chain.
pub(crate) fn describe(error: &RtorrentError) -> String {
    match error {
        RtorrentError::Call {
            source: RpcError::Fault { code, message, .. },
            ..
        } => format!("{error}: {message} (fault {code})"),
        RtorrentError::InvalidArgument { field, reason, .. } => {
            format!("{error}: {field} {}", reason.replace('_', " "))
        }
        _ => {
            let mut text = error.to_string();
            let mut source = error.source();
            while let Some(cause) = source {
                text.push_str(": ");
                text.push_str(&cause.to_string());
                source = cause.source();
            }
            text
        }
    }
}
