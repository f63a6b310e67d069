//! Mapping of service errors to HTTP responses.
//!
//! This is the only place status codes are chosen for failures. Bodies are
//! always `{"error": "..."}` and never carry file paths or OS details; those
//! go to the log instead.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::directory::DirectoryError;
use crate::http::response::ErrorBody;
use crate::subscription::SubscriptionError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid token")]
    Unauthorized,

    #[error("Missing 'id' field in request body")]
    MissingId,

    #[error("Invalid JSON in request body")]
    BadBody(#[from] JsonRejection),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MissingId | ApiError::BadBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Directory(e) => match e {
                DirectoryError::InvalidInput(_)
                | DirectoryError::Conflict(_)
                | DirectoryError::MalformedConfig(_) => StatusCode::BAD_REQUEST,
                DirectoryError::NotFound(_) => StatusCode::NOT_FOUND,
                DirectoryError::ConfigMissing(_)
                | DirectoryError::Io(_)
                | DirectoryError::Serialize(_)
                | DirectoryError::QueueClosed => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Subscription(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Directory(
                DirectoryError::ConfigMissing(_)
                | DirectoryError::Io(_)
                | DirectoryError::Serialize(_),
            ) => "Internal server error: proxy config storage unavailable".to_string(),
            ApiError::Directory(DirectoryError::QueueClosed) => {
                "Internal server error: service is shutting down".to_string()
            }
            ApiError::Subscription(_) => {
                "Internal server error: subscription template unavailable".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ApiError::MissingId, StatusCode::BAD_REQUEST),
            (DirectoryError::InvalidInput("x".into()).into(), StatusCode::BAD_REQUEST),
            (DirectoryError::Conflict("x".into()).into(), StatusCode::BAD_REQUEST),
            (DirectoryError::MalformedConfig("x".into()).into(), StatusCode::BAD_REQUEST),
            (DirectoryError::NotFound("x".into()).into(), StatusCode::NOT_FOUND),
            (DirectoryError::QueueClosed.into(), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err:?}");
        }
    }

    #[test]
    fn test_paths_are_not_exposed() {
        let err: ApiError = DirectoryError::ConfigMissing(PathBuf::from("/srv/secret/config.json")).into();
        assert!(!err.public_message().contains("/srv/secret"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
