//! Utilities
//!
//! - [`AppError`] - request error type
//! - [`AppResponse`] - error response body
//! - logging, time, input validation

pub mod error;
pub mod logger;
pub mod result;
pub mod time;
pub mod validation;

pub use error::{AppError, AppResponse};
pub use result::AppResult;
