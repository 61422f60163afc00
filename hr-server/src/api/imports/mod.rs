//! Import API
//!
//! | Path | Method | Purpose |
//! |------|------|------|
//! | /api/import/json | POST | import the JSON batch in the body |
//! | /api/import/directory | POST | import every JSON file in the import directory |

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::{permissions, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/import", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/json", post(handler::import_json))
        .route("/directory", post(handler::import_directory))
        .layer(middleware::from_fn(require_roles(permissions::IMPORT)))
}
