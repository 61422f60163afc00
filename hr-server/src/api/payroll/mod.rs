//! Payroll API
//!
//! | Path | Method | Auth |
//! |------|------|------|
//! | /api/payroll/sync/{all,departments,positions,employees} | POST | hr, it |
//! | /api/payroll/webhook | POST | `X-Payroll-Token` (when configured) |
//! | /api/payroll/event/{hire,fire} | POST | hr |

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::{permissions, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payroll", routes())
}

fn routes() -> Router<ServerState> {
    let sync_routes = Router::new()
        .route("/sync/all", post(handler::sync_all))
        .route("/sync/departments", post(handler::sync_departments))
        .route("/sync/positions", post(handler::sync_positions))
        .route("/sync/employees", post(handler::sync_employees))
        .layer(middleware::from_fn(require_roles(permissions::IMPORT)));

    let event_routes = Router::new()
        .route("/event/hire", post(handler::hire_event))
        .route("/event/fire", post(handler::fire_event))
        .layer(middleware::from_fn(require_roles(permissions::PAYROLL_EVENTS)));

    // Shared secret instead of JWT, see require_auth
    let webhook_routes = Router::new().route("/webhook", post(handler::webhook));

    sync_routes.merge(event_routes).merge(webhook_routes)
}
