//! Request bodies and credential extraction.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use serde::Deserialize;

/// Body of `POST /add_user` and `POST /del_user`.
///
/// Both fields are optional at the parsing stage so a missing one is
/// reported with a precise message instead of a generic JSON error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRequest {
    pub id: Option<String>,
    pub token: Option<String>,
}

/// Token from `Authorization: Bearer <token>`, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Body token first, bearer header as fallback.
pub fn presented_token<'a>(body: &'a UserRequest, headers: &'a HeaderMap) -> Option<&'a str> {
    body.token.as_deref().or_else(|| bearer_token(headers))
}
