//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, routes)
//!     → request.rs (request ID, unify query/form/JSON into params)
//!     → handler (validation, encoding)
//!     → response.rs (envelope → status, headers, decoded body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{FunctionRequest, Params, UuidRequestId, X_REQUEST_ID};
pub use response::{FunctionResponse, ResponseBody, CORS_HEADERS};
pub use server::{AppState, HttpServer};
