//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, timeout, body limit, request ID, CORS)
//! - Adapt HTTP requests to the QR handler and back
//! - Serve until a shutdown signal arrives

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::handler::QrHandler;
use crate::http::request::{FunctionRequest, Params, UuidRequestId, X_REQUEST_ID};
use crate::http::response::{
    FunctionResponse, CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_ALLOW_ORIGIN,
};
use crate::lifecycle::shutdown_signal;
use crate::observability::metrics;
use crate::render::QrCodeEncoder;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<QrHandler>,
}

/// HTTP server for the QR service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a server backed by the default `qrcode` encoder.
    pub fn new(config: ServiceConfig) -> Self {
        let handler = QrHandler::new(
            Arc::new(QrCodeEncoder::new()),
            config.defaults.clone(),
            config.limits.clone(),
        );
        Self::with_handler(config, handler)
    }

    /// Create a server around an explicit handler.
    pub fn with_handler(config: ServiceConfig, handler: QrHandler) -> Self {
        let state = AppState {
            handler: Arc::new(handler),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The CORS layers sit outermost so that responses produced by the
    /// middleware itself (413, 408, 405) carry the headers too.
    #[allow(deprecated)]
    pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(http_handler))
            .route("/qr", any(http_handler))
            .route("/invoke", post(invoke_handler).options(preflight_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(cors_layer(header::ACCESS_CONTROL_ALLOW_ORIGIN, CORS_ALLOW_ORIGIN))
            .layer(cors_layer(header::ACCESS_CONTROL_ALLOW_METHODS, CORS_ALLOW_METHODS))
            .layer(cors_layer(header::ACCESS_CONTROL_ALLOW_HEADERS, CORS_ALLOW_HEADERS))
    }

    /// The router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn cors_layer(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
}

fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Plain HTTP entry point: parameters from query and body, envelope
/// rendered as a real response.
async fn http_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    tracing::debug!(
        request_id = %request_id(&headers),
        method = %method,
        path = %uri.path(),
        "QR request"
    );

    let request = FunctionRequest::from_http(method, uri.query(), &headers, &body);
    let response = state.handler.handle(request).await;

    metrics::record_request("http", response.status_code, start);
    response.into_response()
}

/// Function-platform entry point: the body is the argument object and the
/// envelope is returned verbatim as JSON.
async fn invoke_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let start = Instant::now();

    // Anything but a JSON object carries no parameters; the handler reports what is missing.
    let args = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        _ => Params::new(),
    };

    let envelope = state
        .handler
        .handle(FunctionRequest::from_invocation(args))
        .await;

    metrics::record_request("invoke", envelope.status_code, start);
    Json::<FunctionResponse>(envelope).into_response()
}

/// Browser preflight for the invocation route.
async fn preflight_handler() -> Response {
    FunctionResponse::preflight().into_response()
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
