//! Public API handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::directory::{MutationKind, MutationSummary};
use crate::http::error::ApiError;
use crate::http::request::{presented_token, UserRequest};
use crate::http::response::MutationReport;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::reload::ServiceRestarter;
use crate::subscription::PROFILE_TITLE_HEADER;

#[derive(Serialize)]
pub struct HealthStatus {
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

/// `POST /add_user`
pub async fn add_user<R: ServiceRestarter>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<MutationReport, ApiError> {
    mutate(state, headers, payload, MutationKind::Add).await
}

/// `POST /del_user`
pub async fn del_user<R: ServiceRestarter>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<MutationReport, ApiError> {
    mutate(state, headers, payload, MutationKind::Remove).await
}

async fn mutate<R: ServiceRestarter>(
    state: AppState<R>,
    headers: HeaderMap,
    payload: Result<Json<UserRequest>, JsonRejection>,
    kind: MutationKind,
) -> Result<MutationReport, ApiError> {
    let Json(request) = payload?;

    if !state.token_matches(presented_token(&request, &headers)) {
        tracing::warn!(op = kind.as_str(), "Rejected mutation with invalid token");
        return Err(ApiError::Unauthorized);
    }

    let id = request.id.as_deref().ok_or(ApiError::MissingId)?;

    let mutation: MutationSummary = match kind {
        MutationKind::Add => state.queue.add(id).await?,
        MutationKind::Remove => state.queue.remove(id).await?,
    };

    // the queue is free again; the restart only delays this caller and
    // runs on its own task so a disconnect cannot cancel it halfway
    let outcome = state.reload.reload_detached().await;

    Ok(MutationReport::new(mutation, outcome))
}

/// `GET /sub/{id}`
pub async fn subscription<R: ServiceRestarter>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let sub = match state.renderer.render_for(&id).await {
        Ok(sub) => sub,
        Err(e) => {
            metrics::record_subscription("error");
            return Err(e.into());
        }
    };

    let title = HeaderValue::try_from(sub.title_header).map_err(|_| ApiError::Internal)?;
    metrics::record_subscription("rendered");
    tracing::debug!(id = %id, "Subscription rendered");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8")),
            (HeaderName::from_static(PROFILE_TITLE_HEADER), title),
        ],
        sub.payload,
    )
        .into_response())
}
