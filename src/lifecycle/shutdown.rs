//! Stop sequence for the server and the mutation worker.
//!
//! Once [`Shutdown::trigger`] fires, the HTTP server stops accepting and lets
//! in-flight requests finish (including any restart they are waiting on),
//! while the mutation worker closes its queue and answers every command that
//! was already submitted. The flag is sticky: a listener created after the
//! trigger sees it at once.

use tokio::sync::watch;

/// Sticky stop flag shared by `main`, the signal listener and the server.
#[derive(Clone)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Start stopping. Returns false if a stop was already under way.
    pub fn trigger(&self) -> bool {
        let first = self.tx.send_if_modified(|stopping| !std::mem::replace(stopping, true));
        if first {
            tracing::info!(
                listeners = self.tx.receiver_count(),
                "Stopping: draining requests and pending mutations"
            );
        } else {
            tracing::debug!("Stop already requested");
        }
        first
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half handed to long-running tasks.
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolve once a stop is requested.
    ///
    /// Never resolves if every [`Shutdown`] handle is dropped without
    /// triggering; the owner then stops the task by other means.
    pub async fn recv(&mut self) {
        let stopping = self.rx.wait_for(|stopping| *stopping).await.is_ok();
        if !stopping {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_all_listeners() {
        let shutdown = Shutdown::new();
        let mut server = shutdown.listener();
        let mut worker = shutdown.clone().listener();

        assert!(shutdown.trigger());
        server.recv().await;
        worker.recv().await;
    }

    #[tokio::test]
    async fn test_second_trigger_is_noop() {
        let shutdown = Shutdown::new();
        assert!(shutdown.trigger());
        assert!(!shutdown.trigger());
    }

    #[tokio::test]
    async fn test_late_listener_sees_stop() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let mut late = shutdown.listener();
        tokio::time::timeout(Duration::from_secs(1), late.recv())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_listener_waits_until_triggered() {
        let shutdown = Shutdown::new();
        let mut listener = shutdown.listener();

        let waited = tokio::time::timeout(Duration::from_millis(50), listener.recv()).await;
        assert!(waited.is_err());
    }
}
