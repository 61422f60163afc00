//! IT Account API (read only)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::{permissions, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/it-accounts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn(require_roles(permissions::IT_ACCOUNTS_READ)))
}
