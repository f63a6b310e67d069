//! Proxy reload subsystem.
//!
//! # Data Flow
//! ```text
//! mutation committed to disk
//!     → coordinator.rs (bounded wait, logging, metrics)
//!     → restarter.rs (container runtime: `docker restart <name>`)
//!     → ReloadOutcome back to the HTTP layer
//! ```
//!
//! # Design Decisions
//! - A failed restart is reported, not rolled back; the file stays updated
//! - No retry loop; the caller or operator resubmits
//! - Runs outside the mutation queue so a slow restart holds no file access

pub mod coordinator;
pub mod restarter;

pub use coordinator::{ReloadCoordinator, ReloadOutcome};
pub use restarter::{CliRestarter, ReloadError, ServiceRestarter};
