//! Authentication and authorization
//!
//! - [`JwtService`] - token validation
//! - [`CurrentUser`] - caller identity
//! - [`require_auth`] - authentication middleware
//! - [`require_roles`] - role check middleware

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod permissions;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_roles};
