//! Control plane for an Xray proxy: client directory, reload and subscriptions.

pub mod admin;
pub mod config;
pub mod directory;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod reload;
pub mod subscription;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
