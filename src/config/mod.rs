//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (CONFIG_FILE, SUB_FILE, TOKEN, PORT, TITLE, XRAY_NAME)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (immutable, shared with subsystems)
//! ```
//!
//! This is the service's own configuration. The proxy's JSON document it
//! edits lives in the `directory` subsystem.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AuthConfig, ListenerConfig, LogFormat, ObservabilityConfig, ReloadConfig, ServiceConfig,
    StorageConfig, SubscriptionConfig,
};
