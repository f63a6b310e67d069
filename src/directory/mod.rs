//! Client directory subsystem.
//!
//! # Data Flow
//! ```text
//! add/remove request
//!     → queue.rs (serialize writers, one command at a time)
//!     → store.rs (read proxy config from disk)
//!     → document.rs (parsed tree, unknown fields kept as-is)
//!     → manager.rs (pure transform: old document → new document)
//!     → store.rs (temp file + rename)
//!     → reply with totals; caller triggers reload
//! ```
//!
//! # Design Decisions
//! - The file is the only source of truth; nothing is cached between requests
//! - Every inbound with a client list mirrors the same directory
//! - Validation errors surface before any write happens

pub mod document;
pub mod error;
pub mod manager;
pub mod queue;
pub mod store;

pub use document::{Client, InboundSummary, ProxyDocument};
pub use error::{DirectoryError, DirectoryResult};
pub use manager::{add_client, remove_client, Mutation, MutationKind, MutationSummary};
pub use queue::MutationQueue;
pub use store::ConfigStore;
