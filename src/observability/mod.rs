//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handler and HTTP layer produce:
//!     → logging.rs (structured tracing events, request ID spans)
//!     → metrics.rs (request counters, latency histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
