//! Container runtime restart capability.

use std::future::Future;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Errors a restart can end with.
#[derive(Debug, Error)]
pub enum ReloadError {
    /// The runtime CLI could not be started.
    #[error("failed to run container runtime: {0}")]
    Spawn(#[from] std::io::Error),

    /// The runtime ran but reported failure.
    #[error("restart of '{service}' failed (exit code {code:?}): {stderr}")]
    Exited {
        service: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The restart did not finish in time.
    #[error("restart of '{service}' timed out after {secs}s")]
    TimedOut { service: String, secs: u64 },
}

/// Restart a named service and report whether it worked.
///
/// Implemented by the container runtime in production and by fakes in tests.
pub trait ServiceRestarter: Send + Sync + 'static {
    fn restart(&self, service: &str) -> impl Future<Output = Result<(), ReloadError>> + Send;
}

/// Restarts a container through the runtime CLI (`docker restart <name>`).
#[derive(Debug, Clone)]
pub struct CliRestarter {
    runtime: String,
}

impl CliRestarter {
    pub fn new(runtime: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
        }
    }
}

impl ServiceRestarter for CliRestarter {
    async fn restart(&self, service: &str) -> Result<(), ReloadError> {
        // kill_on_drop: a timed-out restart drops this future and must not leave the CLI behind
        let output = Command::new(&self.runtime)
            .arg("restart")
            .arg(service)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if output.status.success() {
            return Ok(());
        }

        Err(ReloadError::Exited {
            service: service.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_runtime() {
        // `true restart xray` exits 0
        let restarter = CliRestarter::new("true");
        assert!(restarter.restart("xray").await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_runtime() {
        let restarter = CliRestarter::new("false");
        let err = restarter.restart("xray").await.unwrap_err();
        assert!(matches!(err, ReloadError::Exited { code: Some(1), .. }));
    }

    #[tokio::test]
    async fn test_missing_runtime() {
        let restarter = CliRestarter::new("/nonexistent/container-runtime");
        assert!(matches!(restarter.restart("xray").await, Err(ReloadError::Spawn(_))));
    }
}
