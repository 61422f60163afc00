//! HR Desk Server - HR and IT lifecycle backend
//!
//! - **Store** (`store`): embedded redb entity store
//! - **Gateways** (`gateways`): ticketing, directory, mail, payroll, notifications
//! - **Reconcile** (`reconcile`): JSON files, payroll catalogs, webhook events
//! - **Lifecycle** (`lifecycle`): provisioning on hire, deprovisioning on fire
//! - **Scheduler** (`scheduler`): due request sweep
//! - **HTTP API** (`api`)
//!
//! ```text
//! hr-server/src/
//! ├── core/          # config, state, background tasks
//! ├── auth/          # JWT, roles
//! ├── api/           # routes and handlers
//! ├── gateways/      # external system clients
//! ├── store/         # entity store
//! ├── reconcile/     # import engine
//! ├── lifecycle/     # request execution
//! ├── sync/          # ticketing and directory sync
//! └── utils/         # errors, logging, time, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod gateways;
pub mod lifecycle;
pub mod reconcile;
pub mod scheduler;
pub mod store;
pub mod sync;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Audit logging macro - writes the audit table and emits an `audit` event
//
// Evaluates to `StoreResult<AuditEntry>`; callers propagate with `?`.
#[macro_export]
macro_rules! audit_log {
    ($store:expr, $user:expr, $action:expr, $entity:expr, $($details:tt)+) => {{
        let details = format!($($details)+);
        tracing::info!(
            target: "audit",
            user = %$user,
            action = $action,
            entity = $entity,
            details = %details,
            "AUDIT"
        );
        $store.audit(&$user, $action, $entity, Some(details))
    }};
}

// Security logging macro - accepts tracing field syntax
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::warn!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Loads `.env` and sets up logging
///
/// | Variable | Meaning |
/// |----------|---------|
/// | LOG_LEVEL | level when RUST_LOG is unset (default info) |
/// | LOG_DIR | daily rolling log files, when the directory exists |
pub fn setup_environment() {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
    __  ______     ____            __
   / / / / __ \   / __ \___  _____/ /__
  / /_/ / /_/ /  / / / / _ \/ ___/ //_/
 / __  / _, _/  / /_/ /  __(__  ) ,<
/_/ /_/_/ |_|  /_____/\___/____/_/|_|
    "#
    );
}
