use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::WebhookResponseDto;

/// Errors that can occur while accepting a payment or update webhook.
#[derive(Error, Debug)]
pub enum WebhookError {
    /// The endpoint has no secret configured and is therefore switched off.
    #[error("webhook endpoint is disabled")]
    Disabled,

    /// The signature header is missing.
    #[error("missing signature header")]
    MissingSignature,

    /// The signature header could not be parsed.
    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    /// HMAC verification failed.
    #[error("invalid signature")]
    InvalidSignature,

    /// The signed timestamp is too far from the current time.
    #[error("signature timestamp {timestamp} outside tolerance")]
    TimestampOutOfTolerance { timestamp: i64 },

    /// The payload could not be parsed or lacks required fields.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Processing failed after the request was accepted.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WebhookError {
    /// Returns the HTTP status code for this error.
    ///
    /// - Disabled: 404 Not Found (the endpoint is hidden when unconfigured)
    /// - Any signature problem: 400 Bad Request
    /// - Invalid payload: 400 Bad Request
    /// - Internal: 500 Internal Server Error
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Disabled => StatusCode::NOT_FOUND,
            Self::MissingSignature
            | Self::InvalidSignatureFormat(_)
            | Self::InvalidSignature
            | Self::TimestampOutOfTolerance { .. }
            | Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Every signature failure reads the same so callers
    /// cannot probe which part of the check failed.
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::Disabled => "Not Found",
            Self::MissingSignature
            | Self::InvalidSignatureFormat(_)
            | Self::InvalidSignature
            | Self::TimestampOutOfTolerance { .. } => "Invalid signature",
            Self::InvalidPayload(_) => "Invalid payload",
            Self::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        tracing::debug!("Rejecting webhook request: {}", self);

        (
            self.status_code(),
            Json(WebhookResponseDto::failure(self.public_message())),
        )
            .into_response()
    }
}
