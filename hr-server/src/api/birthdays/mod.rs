//! Birthdays API

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::{permissions, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/birthdays", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route_layer(middleware::from_fn(require_roles(permissions::ORG_READ)))
}
