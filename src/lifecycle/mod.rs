//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load settings → Validate → Logging/metrics → Spawn mutation worker → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     trigger() → Server stops accepting, in-flight requests finish
//!              → Worker closes its queue, answers queued mutations, exits
//!              → run() returns
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownListener};
