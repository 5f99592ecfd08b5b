//! QR code generation service library.

pub mod config;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod render;

pub use config::ServiceConfig;
pub use handler::{OutputFormat, QrHandler};
pub use http::{FunctionRequest, FunctionResponse, HttpServer};
pub use lifecycle::Shutdown;
pub use render::{QrCodeEncoder, QrEncoder};
