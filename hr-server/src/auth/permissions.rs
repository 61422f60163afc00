//! Roles and the permission sets built from them
//!
//! The token issuer writes the role into the `role` claim. `admin` passes every check.

pub const ADMIN: &str = "admin";
pub const HR: &str = "hr";
pub const IT: &str = "it";
pub const MANAGER: &str = "manager";
pub const AUDITOR: &str = "auditor";

/// Org structure and staff: read
pub const ORG_READ: &[&str] = &[HR, IT, MANAGER, AUDITOR];
/// Org structure and staff: write
pub const ORG_WRITE: &[&str] = &[HR];

/// Equipment
pub const EQUIPMENT_READ: &[&str] = &[IT, AUDITOR];
pub const EQUIPMENT_WRITE: &[&str] = &[IT];

pub const IT_ACCOUNTS_READ: &[&str] = &[IT, AUDITOR];

/// HR requests: list, create, execute
pub const REQUESTS_READ: &[&str] = &[HR, IT, AUDITOR];
pub const REQUESTS_CREATE: &[&str] = &[HR];
pub const REQUESTS_PROCESS: &[&str] = &[IT];

/// Imports and payroll catalog sync
pub const IMPORT: &[&str] = &[HR, IT];
/// Payroll hire/fire events
pub const PAYROLL_EVENTS: &[&str] = &[HR];

pub const INTEGRATIONS: &[&str] = &[IT];

pub const AUDIT_READ: &[&str] = &[AUDITOR];

pub const ALL_ROLES: &[&str] = &[ADMIN, HR, IT, MANAGER, AUDITOR];

pub fn is_known_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}
