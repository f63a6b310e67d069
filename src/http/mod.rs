//! HTTP front door.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, request ID, trace, timeout layers)
//!     → request.rs (JSON body, token extraction)
//!     → handlers.rs (add_user / del_user / sub / health)
//!         → directory queue, reload coordinator, subscription renderer
//!     → response.rs (two-phase mutation report)
//!     → error.rs (status mapping, `{"error": ...}` bodies)
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
