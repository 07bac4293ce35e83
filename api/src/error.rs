//! Unified error types for the FBA profit API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core business logic and persistence errors
//! - `IdentityError`: Hosted identity service client errors
//! - `AppError`: Application layer errors (wraps the above for HTTP responses)
//!
//! Quota denials are not errors; see `UsageDecision` and `SaveOutcome`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Identity service client errors
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Unauthorized - invalid or expired token")]
    Unauthorized,

    /// The service rejected our own credentials (anon key)
    #[error("Identity service misconfigured: {0}")]
    Misconfigured(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Identity service error: {0}")]
    Identity(IdentityError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    /// A backend (identity service or record store) is not configured
    #[error("Service not configured: {0}")]
    Unconfigured(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// A rejected anon key is a configuration problem, not a client one
impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::Misconfigured(msg) => {
                tracing::error!("Identity service rejected the configured anon key: {}", msg);
                AppError::Unconfigured(format!("Identity service rejected credentials: {}", msg))
            }
            e => AppError::Identity(e),
        }
    }
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "Not found", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::Database(msg)) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Domain(DomainError::Internal(msg)) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Identity(e) => {
                tracing::error!("Identity service error: {}", e);
                match e {
                    IdentityError::Unauthorized => {
                        (StatusCode::UNAUTHORIZED, "Unauthorized", None)
                    }
                    IdentityError::Misconfigured(msg) => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Service not configured",
                        Some(msg.clone()),
                    ),
                    IdentityError::RateLimited => {
                        (StatusCode::TOO_MANY_REQUESTS, "Rate limited", None)
                    }
                    IdentityError::Api { status, message } if (400..500).contains(status) => (
                        StatusCode::BAD_REQUEST,
                        "Identity service rejected the request",
                        Some(message.clone()),
                    ),
                    _ => (StatusCode::BAD_GATEWAY, "Identity service error", None),
                }
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            AppError::Unconfigured(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service not configured",
                Some(msg.clone()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
