//! QR request handler.
//!
//! # Data Flow
//! ```text
//! FunctionRequest (method + params)
//!     → OPTIONS? → 204 preflight
//!     → params.rs (resolve: text, format, render options)
//!     → render (blocking pool: data URI | SVG | PNG)
//!     → FunctionResponse (status, CORS + content type, body)
//! ```
//!
//! # Design Decisions
//! - `process` returns `Result`; only `handle` turns errors into envelopes
//! - Encoding is CPU-bound and runs on the blocking pool
//! - No state is carried between invocations

pub mod error;
pub mod params;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::{QrDefaults, RenderLimits};
use crate::http::request::FunctionRequest;
use crate::http::response::FunctionResponse;
use crate::render::{EncodingError, QrCodeEncoder, QrEncoder};

pub use error::{HandlerError, ValidationError};
pub use params::{resolve, QrRequest};

/// Output representation requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON body with a PNG data URI.
    Base64,
    /// Raw SVG markup.
    Svg,
    /// PNG bytes, base64-encoded for the gateway.
    Png,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 3] = ["base64", "svg", "png"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "base64" => Some(Self::Base64),
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

/// Output of a single encode call.
enum Rendered {
    DataUrl(String),
    Svg(String),
    Png(Vec<u8>),
}

/// Stateless QR request handler.
#[derive(Clone)]
pub struct QrHandler {
    encoder: Arc<dyn QrEncoder>,
    defaults: QrDefaults,
    limits: RenderLimits,
}

impl Default for QrHandler {
    fn default() -> Self {
        Self::new(
            Arc::new(QrCodeEncoder::new()),
            QrDefaults::default(),
            RenderLimits::default(),
        )
    }
}

impl QrHandler {
    pub fn new(encoder: Arc<dyn QrEncoder>, defaults: QrDefaults, limits: RenderLimits) -> Self {
        Self {
            encoder,
            defaults,
            limits,
        }
    }

    /// Handle one invocation. Always produces a response.
    pub async fn handle(&self, request: FunctionRequest) -> FunctionResponse {
        match self.process(request).await {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    HandlerError::Validation(reason) => {
                        tracing::info!(reason = %reason, "Rejected QR request");
                    }
                    HandlerError::Encoding(err) => {
                        tracing::error!(error = %err, "QR generation failed");
                    }
                }
                e.into_response()
            }
        }
    }

    /// Core request logic; failures are returned, not rendered.
    pub async fn process(&self, request: FunctionRequest) -> Result<FunctionResponse, HandlerError> {
        if request.method == Method::OPTIONS {
            return Ok(FunctionResponse::preflight());
        }

        let QrRequest {
            text,
            format,
            options,
        } = resolve(&request.params, &self.defaults, &self.limits)?;

        tracing::debug!(
            format = format.as_str(),
            text_len = text.len(),
            size = options.size,
            margin = options.margin,
            level = ?options.error_correction,
            "Generating QR code"
        );

        let encoder = Arc::clone(&self.encoder);
        let job_text = text.clone();
        let rendered = tokio::task::spawn_blocking(move || match format {
            OutputFormat::Base64 => encoder.data_url(&job_text, &options).map(Rendered::DataUrl),
            OutputFormat::Svg => encoder.svg(&job_text, &options).map(Rendered::Svg),
            OutputFormat::Png => encoder.png(&job_text, &options).map(Rendered::Png),
        })
        .await
        .map_err(|e| EncodingError::Worker(e.to_string()))??;

        Ok(match rendered {
            Rendered::DataUrl(uri) => FunctionResponse::json(
                StatusCode::OK,
                json!({
                    "success": true,
                    "text": text,
                    "format": OutputFormat::Base64.as_str(),
                    "qrCode": uri,
                }),
            ),
            Rendered::Svg(markup) => FunctionResponse::svg(markup),
            Rendered::Png(bytes) => FunctionResponse::png(&bytes),
        })
    }
}
