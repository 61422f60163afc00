//! HR Request API
//!
//! | Path | Method | Roles |
//! |------|------|------|
//! | /api/hr-requests | GET | hr, it, auditor |
//! | /api/hr-requests | POST | hr |
//! | /api/hr-requests/{id}/process | POST | it |
//! | /api/hr-requests/process-due | POST | it |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{permissions, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/hr-requests", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn(require_roles(permissions::REQUESTS_READ)));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_roles(permissions::REQUESTS_CREATE)));

    let process_routes = Router::new()
        .route("/{id}/process", post(handler::process))
        .route("/process-due", post(handler::process_due))
        .layer(middleware::from_fn(require_roles(permissions::REQUESTS_PROCESS)));

    read_routes.merge(create_routes).merge(process_routes)
}
