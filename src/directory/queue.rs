//! Single-writer mutation queue.
//!
//! All add/remove requests are funnelled through one tokio task that owns
//! the [`ConfigStore`]. The task runs load → transform → save for one
//! command at a time, so two requests can never interleave their reads and
//! writes of the proxy document.
//!
//! ```text
//! handler ──MutationCommand──▶ mpsc ──▶ MutationWorker
//!    ▲                                     │ load / add|remove / save
//!    └────────── oneshot reply ◀───────────┘
//! ```
//!
//! Restarting the proxy is not the worker's job: it replies as soon as the
//! file is replaced and the caller drives the reload.

use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::directory::error::{DirectoryError, DirectoryResult};
use crate::directory::manager::{add_client, remove_client, MutationKind, MutationSummary};
use crate::directory::store::ConfigStore;
use crate::lifecycle::ShutdownListener;
use crate::observability::metrics;

/// A request for the worker.
#[derive(Debug)]
pub struct MutationCommand {
    pub kind: MutationKind,
    pub id: String,
    pub reply: oneshot::Sender<DirectoryResult<MutationSummary>>,
}

/// Cloneable handle used to submit mutations.
#[derive(Debug, Clone)]
pub struct MutationQueue {
    tx: mpsc::Sender<MutationCommand>,
}

impl MutationQueue {
    /// Spawn the worker task. It exits when `shutdown` fires (after answering
    /// what is already queued) or every handle is dropped.
    pub fn spawn(
        store: ConfigStore,
        capacity: usize,
        shutdown: ShutdownListener,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = MutationWorker { store, rx };
        let handle = tokio::spawn(worker.run(shutdown));
        (Self { tx }, handle)
    }

    pub async fn add(&self, id: &str) -> DirectoryResult<MutationSummary> {
        self.submit(MutationKind::Add, id).await
    }

    pub async fn remove(&self, id: &str) -> DirectoryResult<MutationSummary> {
        self.submit(MutationKind::Remove, id).await
    }

    async fn submit(&self, kind: MutationKind, id: &str) -> DirectoryResult<MutationSummary> {
        let (reply, rx) = oneshot::channel();
        let command = MutationCommand {
            kind,
            id: id.to_string(),
            reply,
        };
        self.tx
            .send(command)
            .await
            .map_err(|_| DirectoryError::QueueClosed)?;
        rx.await.map_err(|_| DirectoryError::QueueClosed)?
    }
}

struct MutationWorker {
    store: ConfigStore,
    rx: mpsc::Receiver<MutationCommand>,
}

impl MutationWorker {
    async fn run(mut self, mut shutdown: ShutdownListener) {
        tracing::info!(path = ?self.store.path(), "Mutation worker started");

        loop {
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
                _ = shutdown.recv() => {
                    // refuse new submissions, answer everything already queued
                    self.rx.close();
                    let mut drained = 0usize;
                    while let Some(command) = self.rx.recv().await {
                        self.handle(command).await;
                        drained += 1;
                    }
                    tracing::info!(drained, "Mutation queue drained");
                    break;
                }
            }
        }

        tracing::info!("Mutation worker stopped");
    }

    async fn handle(&self, command: MutationCommand) {
        let result = self.apply(command.kind, &command.id).await;
        // caller may have given up (request timeout); nothing to do then
        let _ = command.reply.send(result);
    }

    async fn apply(&self, kind: MutationKind, id: &str) -> DirectoryResult<MutationSummary> {
        let start = Instant::now();
        let result = self.load_transform_save(kind, id).await;

        match &result {
            Ok(m) => {
                tracing::info!(
                    op = kind.as_str(),
                    id = %m.id,
                    inbounds = m.affected_inbounds,
                    total_users = m.total_users,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Directory mutation committed"
                );
                metrics::record_mutation(kind.as_str(), "committed");
                metrics::record_directory_size(m.total_users);
            }
            Err(e) => {
                tracing::warn!(op = kind.as_str(), id = %id, error = %e, "Directory mutation rejected");
                metrics::record_mutation(kind.as_str(), outcome_label(e));
            }
        }

        result
    }

    async fn load_transform_save(&self, kind: MutationKind, id: &str) -> DirectoryResult<MutationSummary> {
        let doc = self.store.load().await?;
        let mutation = match kind {
            MutationKind::Add => add_client(&doc, id)?,
            MutationKind::Remove => remove_client(&doc, id)?,
        };
        self.store.save(&mutation.document).await?;
        Ok(mutation.into_summary())
    }
}

fn outcome_label(err: &DirectoryError) -> &'static str {
    match err {
        DirectoryError::InvalidInput(_) => "invalid_input",
        DirectoryError::Conflict(_) => "conflict",
        DirectoryError::NotFound(_) => "not_found",
        DirectoryError::MalformedConfig(_) => "malformed_config",
        DirectoryError::ConfigMissing(_)
        | DirectoryError::Io(_)
        | DirectoryError::Serialize(_)
        | DirectoryError::QueueClosed => "io_error",
    }
}
