//! Shared types for the HR desk
//!
//! Domain records used by the server and its API clients, plus the
//! naming rules for generated account handles.

pub mod models;
pub mod naming;

// Re-exports
pub use serde::{Deserialize, Serialize};
