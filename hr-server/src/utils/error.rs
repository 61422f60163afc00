//! Request error handling
//!
//! # Error codes
//!
//! | Prefix | Class | Example |
//! |--------|-------|---------|
//! | E2xxx | permission | E2001 forbidden |
//! | E3xxx | authentication | E3001 no token, E3002 invalid token |
//! | E0xxx | business | E0003 not found |
//! | E9xxx | system | E9002 database |
//!
//! ```ignore
//! Err(AppError::not_found("Employee 7"))
//!
//! // Store errors convert with `?`
//! let employee: Employee = state.store.require(id)?;
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::lifecycle::LifecycleError;
use crate::reconcile::{EventError, ImportError, PayrollSyncError};
use crate::store::StoreError;

/// Error response body
///
/// ```json
/// {
///   "code": "E0003",
///   "message": "employee 7"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication (4xx) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== Business rules (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    // ========== System (5xx) ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::TokenExpired | Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "E3001",
            Self::InvalidToken(_) => "E3002",
            Self::TokenExpired => "E3003",
            Self::Forbidden(_) => "E2001",
            Self::Validation(_) => "E0002",
            Self::NotFound(_) => "E0003",
            Self::Conflict(_) => "E0004",
            Self::Internal(_) => "E9001",
            Self::Database(_) => "E9002",
        }
    }

    /// Message sent to the client; 5xx details stay in the log
    fn public_message(&self) -> String {
        match self {
            Self::Unauthorized => "Please login first".into(),
            Self::InvalidToken(_) => "Invalid token".into(),
            Self::TokenExpired => "Token expired".into(),
            Self::Forbidden(msg) | Self::Validation(msg) | Self::NotFound(msg) | Self::Conflict(msg) => {
                msg.clone()
            }
            Self::Database(_) => "Database error".into(),
            Self::Internal(_) => "Internal server error".into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::Database(msg) => error!(target: "database", error = %msg, "Database error occurred"),
            Self::Internal(msg) => error!(target: "internal", error = %msg, "Internal error occurred"),
            _ => {}
        }

        let body = AppResponse {
            code: self.code().to_string(),
            message: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn token_expired() -> Self {
        Self::TokenExpired
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

// ========== Conversions ==========

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { entity, id } => Self::NotFound(format!("{} {}", entity, id)),
            StoreError::Duplicate { .. } | StoreError::Conflict(_) => Self::Conflict(e.to_string()),
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(e: LifecycleError) -> Self {
        match e {
            LifecycleError::NotFound { .. } => Self::NotFound(e.to_string()),
            LifecycleError::UnknownType(_) => Self::Validation(e.to_string()),
            LifecycleError::AlreadyProcessed(_) => Self::Conflict(e.to_string()),
            LifecycleError::Store(inner) => inner.into(),
        }
    }
}

impl From<EventError> for AppError {
    fn from(e: EventError) -> Self {
        match e {
            EventError::Validation(msg) => Self::Validation(msg),
            EventError::NotFound(_) => Self::NotFound(e.to_string()),
            EventError::Store(inner) => inner.into(),
        }
    }
}

impl From<ImportError> for AppError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::DirectoryNotFound(_) => Self::NotFound(e.to_string()),
            ImportError::Io(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<PayrollSyncError> for AppError {
    fn from(e: PayrollSyncError) -> Self {
        Self::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_details_hidden() {
        let response = AppError::Database("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::Database(String::new()).public_message(), "Database error");
        assert_eq!(AppError::not_found("employee 9").public_message(), "employee 9");
        assert_eq!(AppError::token_expired().code(), "E3003");
    }

    #[test]
    fn test_status_mapping() {
        let status = |e: AppError| e.into_response().status();
        assert_eq!(status(AppError::unauthorized()), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AppError::forbidden("x")), StatusCode::FORBIDDEN);
        assert_eq!(status(AppError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::internal("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status(LifecycleError::UnknownType("transfer".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(LifecycleError::AlreadyProcessed(1).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(StoreError::NotFound { entity: "employee", id: 3 }.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(PayrollSyncError::NotConfigured.into()),
            StatusCode::BAD_REQUEST
        );
    }
}
