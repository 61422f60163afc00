use thiserror::Error;

use crate::auth::JwtError;
use crate::store::StoreError;

/// Startup and runtime errors
///
/// Request handling uses [`crate::utils::AppError`] instead.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    #[error("JWT setup failed: {0}")]
    Jwt(#[from] JwtError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result alias for startup code
pub type Result<T> = std::result::Result<T, ServerError>;
