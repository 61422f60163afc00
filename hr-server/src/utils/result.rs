//! Result alias for handlers

use crate::AppError;

/// Result used by handlers
pub type AppResult<T> = Result<T, AppError>;
