//! Response bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::directory::{MutationKind, MutationSummary};
use crate::reload::ReloadOutcome;

/// Error body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Result of an add or remove, split into the two phases.
///
/// `config_updated` is always true here: failures before the write are
/// returned as errors. `reloaded` is false when the restart failed or was
/// skipped, and `reload_error` explains a failure.
#[derive(Debug, Serialize)]
pub struct MutationReport {
    pub message: String,
    pub total_users: usize,
    pub all_users: Vec<String>,
    pub config_updated: bool,
    pub reloaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reload_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_from: Option<usize>,
}

impl MutationReport {
    pub fn new(mutation: MutationSummary, outcome: ReloadOutcome) -> Self {
        let verb = match mutation.kind {
            MutationKind::Add => "added",
            MutationKind::Remove => "removed",
        };
        let (message, reloaded, reload_error) = match outcome {
            ReloadOutcome::Reloaded => (
                format!("User '{}' {} successfully", mutation.id, verb),
                true,
                None,
            ),
            ReloadOutcome::Skipped => (
                format!("User '{}' {} successfully (proxy restart disabled)", mutation.id, verb),
                false,
                None,
            ),
            ReloadOutcome::Failed { reason } => (
                format!("User '{}' {}, but proxy restart failed", mutation.id, verb),
                false,
                Some(reason),
            ),
        };
        let removed_from = match mutation.kind {
            MutationKind::Remove => Some(mutation.affected_inbounds),
            MutationKind::Add => None,
        };

        Self {
            message,
            total_users: mutation.total_users,
            all_users: mutation.all_users,
            config_updated: true,
            reloaded,
            reload_error,
            removed_from,
        }
    }

    /// 201 when done, 500 when the config changed but the proxy did not restart.
    pub fn status(&self) -> StatusCode {
        if self.reload_error.is_some() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::CREATED
        }
    }
}

impl IntoResponse for MutationReport {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
