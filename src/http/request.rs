//! Request handling and parameter unification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for tracing
//! - Unify query string, form body and JSON body into one parameter map
//! - Decode function-platform invocations (`__ow_method` + arguments)
//!
//! # Design Decisions
//! - Body parameters override query parameters of the same name
//! - A body that cannot be parsed contributes no parameters; the handler
//!   then reports what is missing
//! - Query and form values are kept as strings; typing happens in the handler

use axum::http::{header, HeaderMap, HeaderValue, Method, Request};
use serde_json::{Map, Value};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Argument naming the HTTP method in platform invocations.
pub const METHOD_ARG: &str = "__ow_method";

/// Unified caller parameters.
pub type Params = Map<String, Value>;

/// A request as seen by the QR handler.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionRequest {
    pub method: Method,
    pub params: Params,
}

impl FunctionRequest {
    pub fn new(method: Method, params: Params) -> Self {
        Self { method, params }
    }

    /// Build from a platform invocation: the argument object itself, with
    /// the HTTP method under `__ow_method` (defaults to POST).
    pub fn from_invocation(mut args: Params) -> Self {
        let method = match args.remove(METHOD_ARG) {
            Some(Value::String(name)) => {
                Method::from_bytes(name.to_ascii_uppercase().as_bytes()).unwrap_or(Method::POST)
            }
            _ => Method::POST,
        };
        Self::new(method, args)
    }

    /// Build from a raw HTTP request's parts.
    pub fn from_http(method: Method, query: Option<&str>, headers: &HeaderMap, body: &[u8]) -> Self {
        let mut params = query.map(parse_form).unwrap_or_default();
        for (key, value) in parse_body(headers, body) {
            params.insert(key, value);
        }
        Self::new(method, params)
    }
}

/// Parse `a=1&b=2` into string-valued parameters.
pub fn parse_form(input: &str) -> Params {
    url::form_urlencoded::parse(input.as_bytes())
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect()
}

/// Extract parameters from a body according to its content type.
///
/// Bodies without a content type are sniffed: a JSON object is accepted,
/// anything else is read as a form.
pub fn parse_body(headers: &HeaderMap, body: &[u8]) -> Params {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Params::new();
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or("").trim().to_ascii_lowercase());

    match content_type.as_deref() {
        Some("application/json") => parse_json_object(body).unwrap_or_else(|| {
            tracing::debug!("Ignoring body that is not a JSON object");
            Params::new()
        }),
        Some("application/x-www-form-urlencoded") => {
            std::str::from_utf8(body).map(parse_form).unwrap_or_default()
        }
        Some(other) => {
            tracing::debug!(content_type = %other, "Ignoring body with unsupported content type");
            Params::new()
        }
        None => parse_json_object(body)
            .or_else(|| std::str::from_utf8(body).ok().map(parse_form))
            .unwrap_or_default(),
    }
}

fn parse_json_object(body: &[u8]) -> Option<Params> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Produces a fresh UUID v4 for every request lacking an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}
