use axum::{extract::State, Json};
use serde::Serialize;

use crate::directory::InboundSummary;
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct DirectoryListing {
    pub total_users: usize,
    pub all_users: Vec<String>,
    pub inbounds: Vec<InboundSummary>,
}

/// Read the directory straight from disk. Does not go through the mutation queue.
pub async fn get_users<R>(
    State(state): State<AppState<R>>,
) -> Result<Json<DirectoryListing>, ApiError> {
    let doc = state.store.load().await?;
    let all_users = doc.user_ids();

    Ok(Json(DirectoryListing {
        total_users: all_users.len(),
        all_users,
        inbounds: doc.summaries(),
    }))
}
