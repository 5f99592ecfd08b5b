//! Response envelope and its conversion to HTTP.
//!
//! # Responsibilities
//! - Model the function-platform response (status, headers, body, base64 flag)
//! - Merge the CORS headers into every envelope
//! - Turn an envelope into a real HTTP response, decoding base64 bodies
//!
//! # Design Decisions
//! - Headers live in a `BTreeMap` so serialized envelopes are stable
//! - Empty bodies and unset flags are omitted from the serialized form

use std::collections::BTreeMap;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Serialize, Serializer};
use serde_json::Value;

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";

/// Headers present on every response, preflight included.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN),
    ("Access-Control-Allow-Methods", CORS_ALLOW_METHODS),
    ("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS),
];

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_SVG: &str = "image/svg+xml";
pub const CONTENT_TYPE_PNG: &str = "image/png";

/// Response body as handed back to the platform.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseBody {
    #[default]
    Empty,
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Serialize for ResponseBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResponseBody::Empty => serializer.serialize_unit(),
            ResponseBody::Json(value) => value.serialize(serializer),
            ResponseBody::Text(text) => serializer.serialize_str(text),
        }
    }
}

/// Uniform response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "ResponseBody::is_empty")]
    pub body: ResponseBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_base64_encoded: Option<bool>,
}

impl FunctionResponse {
    /// Envelope carrying only the CORS headers.
    pub fn new(status: StatusCode) -> Self {
        let headers = CORS_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self {
            status_code: status.as_u16(),
            headers,
            body: ResponseBody::Empty,
            is_base64_encoded: None,
        }
    }

    /// 204 answer to a CORS preflight.
    pub fn preflight() -> Self {
        Self::new(StatusCode::NO_CONTENT)
    }

    pub fn json(status: StatusCode, body: Value) -> Self {
        Self::new(status)
            .with_content_type(CONTENT_TYPE_JSON)
            .with_body(ResponseBody::Json(body))
    }

    pub fn svg(markup: String) -> Self {
        Self::new(StatusCode::OK)
            .with_content_type(CONTENT_TYPE_SVG)
            .with_body(ResponseBody::Text(markup))
    }

    /// Binary PNG carried as base64 text, flagged for the gateway to decode.
    pub fn png(bytes: &[u8]) -> Self {
        let mut response = Self::new(StatusCode::OK)
            .with_content_type(CONTENT_TYPE_PNG)
            .with_body(ResponseBody::Text(STANDARD.encode(bytes)));
        response.is_base64_encoded = Some(true);
        response
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.headers
            .insert("Content-Type".to_string(), content_type.to_string());
        self
    }

    pub fn with_body(mut self, body: ResponseBody) -> Self {
        self.body = body;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for FunctionResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        let base64_body = self.is_base64_encoded.unwrap_or(false);

        let body = match self.body {
            ResponseBody::Empty => Body::empty(),
            ResponseBody::Json(value) => Body::from(value.to_string()),
            ResponseBody::Text(text) if base64_body => match STANDARD.decode(text.as_bytes()) {
                Ok(bytes) => Body::from(bytes),
                Err(e) => {
                    tracing::error!(error = %e, "Envelope flagged base64 but body does not decode");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            },
            ResponseBody::Text(text) => Body::from(text),
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping unrepresentable header"),
            }
        }

        response
    }
}
