//! Configuration validation.
//!
//! Serde covers the syntax; this module checks the values. All problems are
//! collected so an operator sees the full list on the first failed start.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a loaded configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.auth.token.trim().is_empty() {
        errors.push(ValidationError::new("auth.token", "must be set (env TOKEN)"));
    }
    if config.storage.config_file.trim().is_empty() {
        errors.push(ValidationError::new(
            "storage.config_file",
            "must be set (env CONFIG_FILE)",
        ));
    }
    if config.storage.sub_file.trim().is_empty() {
        errors.push(ValidationError::new(
            "storage.sub_file",
            "must be set (env SUB_FILE)",
        ));
    }
    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be > 0"));
    }
    if config.subscription.placeholder.is_empty() {
        errors.push(ValidationError::new("subscription.placeholder", "must not be empty"));
    }
    if config.reload.enabled {
        if config.reload.service_name.trim().is_empty() {
            errors.push(ValidationError::new("reload.service_name", "must not be empty"));
        }
        if config.reload.runtime.trim().is_empty() {
            errors.push(ValidationError::new("reload.runtime", "must not be empty"));
        }
        if config.reload.timeout_secs == 0 {
            errors.push(ValidationError::new("reload.timeout_secs", "must be > 0"));
        }
        // a request must be able to outlast the restart it waits on
        if config.listener.request_timeout_secs <= config.reload.timeout_secs {
            errors.push(ValidationError::new(
                "listener.request_timeout_secs",
                format!(
                    "must be greater than reload.timeout_secs ({}s)",
                    config.reload.timeout_secs
                ),
            ));
        }
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "is not a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
