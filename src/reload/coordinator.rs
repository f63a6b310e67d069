//! Reload orchestration after a committed mutation.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::config::ReloadConfig;
use crate::observability::metrics;
use crate::reload::restarter::{ReloadError, ServiceRestarter};

/// What happened to the proxy process after the file was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReloadOutcome {
    /// The proxy was restarted.
    Reloaded,
    /// Restarts are disabled in configuration.
    Skipped,
    /// The restart failed; the new config waits for the next restart.
    Failed { reason: String },
}

impl ReloadOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ReloadOutcome::Failed { .. })
    }
}

/// Restarts the dependent proxy with a bounded wait.
///
/// Never retries and never rolls back the config: a failure is reported once
/// and the operator decides what to do.
pub struct ReloadCoordinator<R> {
    restarter: Arc<R>,
    service_name: String,
    timeout: Duration,
    enabled: bool,
}

impl<R> Clone for ReloadCoordinator<R> {
    fn clone(&self) -> Self {
        Self {
            restarter: self.restarter.clone(),
            service_name: self.service_name.clone(),
            timeout: self.timeout,
            enabled: self.enabled,
        }
    }
}

impl<R: ServiceRestarter> ReloadCoordinator<R> {
    pub fn new(restarter: R, config: &ReloadConfig) -> Self {
        Self {
            restarter: Arc::new(restarter),
            service_name: config.service_name.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            enabled: config.enabled,
        }
    }

    /// Restart the configured service.
    pub async fn reload(&self) -> ReloadOutcome {
        self.reload_service(&self.service_name).await
    }

    /// Run [`reload`](Self::reload) on its own task.
    ///
    /// The restart keeps going when the returned handle is dropped, so a
    /// caller that goes away mid-restart does not kill the runtime CLI.
    pub fn spawn_reload(&self) -> JoinHandle<ReloadOutcome> {
        let coordinator = self.clone();
        tokio::spawn(async move { coordinator.reload().await })
    }

    /// Restart on a detached task and wait for the outcome.
    pub async fn reload_detached(&self) -> ReloadOutcome {
        match self.spawn_reload().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(service = %self.service_name, error = %e, "Reload task did not complete");
                ReloadOutcome::Failed {
                    reason: format!("reload task aborted: {e}"),
                }
            }
        }
    }

    /// Restart `service_name`, waiting at most the configured timeout.
    pub async fn reload_service(&self, service_name: &str) -> ReloadOutcome {
        if !self.enabled {
            tracing::debug!(service = %service_name, "Reload disabled, skipping restart");
            return ReloadOutcome::Skipped;
        }

        let start = Instant::now();
        tracing::info!(service = %service_name, "Restarting proxy");

        let result = match tokio::time::timeout(self.timeout, self.restarter.restart(service_name)).await {
            Ok(result) => result,
            Err(_) => Err(ReloadError::TimedOut {
                service: service_name.to_string(),
                secs: self.timeout.as_secs(),
            }),
        };

        match result {
            Ok(()) => {
                tracing::info!(
                    service = %service_name,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Proxy restarted"
                );
                metrics::record_reload("success", start);
                ReloadOutcome::Reloaded
            }
            Err(e) => {
                tracing::error!(service = %service_name, error = %e, "Proxy restart failed");
                metrics::record_reload("failure", start);
                ReloadOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
