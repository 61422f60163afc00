//! Department API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch},
};

use crate::auth::{permissions, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/departments", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn(require_roles(permissions::ORG_READ)));

    let write_routes = Router::new()
        .route("/", axum::routing::post(handler::create))
        .route("/{id}", patch(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_roles(permissions::ORG_WRITE)));

    read_routes.merge(write_routes)
}
