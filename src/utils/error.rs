//! Unified error handling
//!
//! [`AppError`] is the application-level error taxonomy. Every variant maps
//! to one stable machine-readable `error` kind plus a human message; internal
//! detail is logged and never leaked to clients.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::db::repository::RepoError;

/// Application error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Client errors (4xx) ==========
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        details: Option<Vec<String>>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Cancellation window expired")]
    WindowExpired,

    #[error("Address is outside the delivery area")]
    OutOfServiceArea,

    #[error("Order has already been rated")]
    AlreadyRated,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // ========== Datastore errors (5xx) ==========
    #[error("Datastore timeout")]
    Timeout,

    #[error("Datastore unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Partial rating failure: {0}")]
    PartialRatingFailure(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body: machine-readable kind + human message
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let details = match &self {
            AppError::Validation { details, .. } => details.clone(),
            _ => None,
        };

        let (status, kind, message) = match &self {
            AppError::Validation { message, .. } => {
                (StatusCode::BAD_REQUEST, "validation_error", message.clone())
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::InvalidTransition(_) => {
                (StatusCode::BAD_REQUEST, "invalid_transition", self.to_string())
            }
            AppError::WindowExpired => {
                (StatusCode::BAD_REQUEST, "window_expired", self.to_string())
            }
            AppError::OutOfServiceArea => {
                (StatusCode::BAD_REQUEST, "out_of_service_area", self.to_string())
            }
            AppError::AlreadyRated => {
                (StatusCode::BAD_REQUEST, "already_rated", self.to_string())
            }
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string())
            }
            AppError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "token_expired", self.to_string())
            }
            AppError::InvalidToken(_) => {
                (StatusCode::UNAUTHORIZED, "invalid_token", self.to_string())
            }
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict", self.to_string()),
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "timeout",
                "Datastore timed out".to_string(),
            ),
            AppError::StoreUnavailable(detail) => {
                error!(target: "datastore", error = %detail, "Datastore error");
                (
                    StatusCode::BAD_GATEWAY,
                    "store_unavailable",
                    "Datastore unavailable".to_string(),
                )
            }
            AppError::PartialRatingFailure(detail) => {
                error!(target: "datastore", error = %detail, "Rating applied partially");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "partial_rating_failure",
                    "Rating could not be applied atomically".to_string(),
                )
            }
            AppError::Internal(detail) => {
                error!(target: "internal", error = %detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: kind,
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::InvalidTransition(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => AppError::NotFound(what),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Duplicate(what) => AppError::Conflict(what),
            RepoError::Timeout => AppError::Timeout,
            RepoError::Database(detail) => AppError::StoreUnavailable(detail),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::validation(format!("Multipart error: {e}"))
    }
}

/// Result alias used by handlers and services
pub type AppResult<T> = Result<T, AppError>;
