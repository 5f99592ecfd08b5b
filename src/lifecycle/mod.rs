//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → every subscriber wakes → server drains and exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT or Shutdown::trigger → graceful shutdown future resolves
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
