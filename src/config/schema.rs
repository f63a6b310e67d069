//! Service configuration schema.
//!
//! All sections default so a minimal deployment only needs the token and
//! the two file paths (usually through environment variables).

use serde::{Deserialize, Serialize};

/// Root configuration for the control-plane service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    pub listener: ListenerConfig,

    /// Locations of the proxy config and subscription template.
    pub storage: StorageConfig,

    /// Shared-secret authentication.
    pub auth: AuthConfig,

    /// Subscription rendering.
    pub subscription: SubscriptionConfig,

    /// Proxy restart settings.
    pub reload: ReloadConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Whole-request timeout in seconds. Must cover a proxy restart.
    pub request_timeout_secs: u64,

    /// Pending mutations allowed before callers wait for queue space.
    pub mutation_queue_capacity: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 60,
            mutation_queue_capacity: 64,
        }
    }
}

/// File locations.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Proxy JSON configuration holding the client lists.
    pub config_file: String,

    /// Subscription template.
    pub sub_file: String,
}

/// Authentication settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Token expected in mutation requests and admin bearer headers.
    pub token: String,
}

/// Subscription settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Title advertised in the `profile-title` header.
    pub title: String,

    /// Token in the template replaced by the client id.
    pub placeholder: String,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            title: "Xray Pult".to_string(),
            placeholder: "$CLIENT$".to_string(),
        }
    }
}

/// Proxy restart settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Restart the proxy after each committed mutation.
    pub enabled: bool,

    /// Container name of the proxy.
    pub service_name: String,

    /// Container runtime CLI (`docker`, `podman`).
    pub runtime: String,

    /// Upper bound for one restart in seconds.
    pub timeout_secs: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "xray-server".to_string(),
            runtime: "docker".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,

    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address for the scrape endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
