//! Handler error taxonomy and its mapping onto response envelopes.

use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::handler::OutputFormat;
use crate::http::response::FunctionResponse;
use crate::render::EncodingError;

/// Example request shown to callers that forgot the payload.
pub const EXAMPLE_TEXT: &str = "https://example.com";

/// Caller input failed a precondition. Surfaced as 400, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing text/url")]
    MissingText,

    #[error("invalid format '{0}'")]
    InvalidFormat(String),
}

/// Any failure inside a single invocation.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Validation(_) => StatusCode::BAD_REQUEST,
            HandlerError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Terminal response for this failure.
    pub fn into_response(self) -> FunctionResponse {
        let status = self.status();
        let body = match self {
            HandlerError::Validation(ValidationError::MissingText) => json!({
                "error": "Please send a \"text\" or \"url\" parameter",
                "example": { "text": EXAMPLE_TEXT },
            }),
            HandlerError::Validation(ValidationError::InvalidFormat(_)) => json!({
                "error": "invalid format",
                "allowed": OutputFormat::NAMES,
            }),
            HandlerError::Encoding(e) => json!({
                "error": "QR generation failed",
                "details": e.to_string(),
            }),
        };
        FunctionResponse::json(status, body)
    }
}
