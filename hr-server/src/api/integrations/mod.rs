//! Integration sync API (ticketing system, directory)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{permissions, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/integrations", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/ticketing/health", get(handler::ticketing_health))
        .route("/ticketing/pull-users", post(handler::pull_ticketing_users))
        .route("/ticketing/push-contacts", post(handler::push_ticketing_contacts))
        .route("/ticketing/sync-all", post(handler::sync_all_ticketing_contacts))
        .route("/ticketing/equipment/{employee_id}", post(handler::pull_equipment))
        .route("/directory/pull-users", post(handler::pull_directory_users))
        .route("/directory/provision", post(handler::preview_handles))
        .layer(middleware::from_fn(require_roles(permissions::INTEGRATIONS)))
}
