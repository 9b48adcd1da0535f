//! Service error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Incomplete input")]
    IncompleteInput,

    #[error("Username has been occupied")]
    UsernameTaken,

    #[error("Email has been occupied")]
    EmailTaken,

    #[error("Not found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Wrong password")]
    WrongPassword,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServiceError::IncompleteInput => (StatusCode::CONFLICT, "Incomplete input"),
            ServiceError::UsernameTaken => {
                (StatusCode::BAD_REQUEST, "Username has been occupied")
            }
            ServiceError::EmailTaken => (StatusCode::BAD_REQUEST, "Email has been occupied"),
            ServiceError::NotFound => (StatusCode::NOT_FOUND, "Not found"),
            ServiceError::Forbidden => (StatusCode::NOT_FOUND, "Not found"),
            ServiceError::InvalidToken => (StatusCode::BAD_REQUEST, "Invalid token"),
            ServiceError::WrongPassword => (StatusCode::BAD_REQUEST, "Wrong password"),
            ServiceError::Conflict(msg) => {
                tracing::warn!("Storage conflict: {}", msg);
                (StatusCode::BAD_REQUEST, "Conflict")
            }
            ServiceError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "success": false, "reason": message });
        (status, axum::Json(body)).into_response()
    }
}
