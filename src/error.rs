//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;

/// Generic body message for 5xx responses
const SERVER_ERROR_MESSAGE: &str = "Error en el servidor";

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error", None),

            // 401 Unauthorized
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized", None),

            // 403 Forbidden
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", None),

            // 404 Not Found
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(domain_err) => match domain_err {
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
                DomainError::UserAlreadyExists => {
                    (StatusCode::CONFLICT, "user_already_exists", None)
                }
                DomainError::EmailInUse => (StatusCode::CONFLICT, "email_in_use", None),
                DomainError::PublicationUnavailable(id) => (
                    StatusCode::CONFLICT,
                    "publication_unavailable",
                    Some(format!("publicacionId={id}")),
                ),
                DomainError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "invalid_credentials", None)
                }
                DomainError::Auth(e) => {
                    tracing::error!("Auth error: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "auth_error", None)
                }
                DomainError::Repository(e) => {
                    tracing::error!("Repository error: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
                }
            },
        };

        let message = if status.is_server_error() {
            SERVER_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            message,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
