use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::error::ApiError;
use crate::http::request::bearer_token;
use crate::http::server::AppState;

/// Require `Authorization: Bearer <token>` on admin routes.
pub async fn admin_auth_middleware<R>(
    State(state): State<AppState<R>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if state.token_matches(bearer_token(request.headers())) {
        return Ok(next.run(request).await);
    }

    tracing::warn!(path = %request.uri().path(), "Rejected admin request with invalid token");
    Err(ApiError::Unauthorized)
}
