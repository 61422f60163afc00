//! Data models
//!
//! Records of the HR/IT desk. Every record is addressed by a `u64` id and
//! refers to other records by id only.

pub mod audit;
pub mod department;
pub mod employee;
pub mod equipment;
pub mod hr_request;
pub mod it_account;
pub mod position;

// Re-exports
pub use audit::*;
pub use department::*;
pub use employee::*;
pub use equipment::*;
pub use hr_request::*;
pub use it_account::*;
pub use position::*;
