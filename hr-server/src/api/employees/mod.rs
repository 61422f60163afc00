//! Employee API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::{permissions, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/employees", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_roles(permissions::ORG_READ)));

    let write_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", patch(handler::update))
        .layer(middleware::from_fn(require_roles(permissions::ORG_WRITE)));

    read_routes.merge(write_routes)
}
