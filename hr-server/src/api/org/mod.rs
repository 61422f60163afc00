//! Org chart API: department, position and employee tree

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::{permissions, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/org", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::tree))
        .route_layer(middleware::from_fn(require_roles(permissions::ORG_READ)))
}
