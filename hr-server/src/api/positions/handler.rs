//! Position API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Department, Position, PositionCreate, PositionUpdate};

use crate::api::check_ref;
use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};

const RESOURCE: &str = "position";

/// GET /api/positions
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Position>>> {
    Ok(Json(state.store.list()?))
}

/// POST /api/positions
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PositionCreate>,
) -> AppResult<Json<Position>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.external_id, "external_id", MAX_SHORT_TEXT_LEN)?;
    check_ref::<Department>(&state, payload.department_id, "department_id")?;

    let position = state.store.insert(Position::from(payload))?;
    audit_log!(state.store, user.username, "create", RESOURCE, "id={} name={}", position.id, position.name)?;
    Ok(Json(position))
}

/// PATCH /api/positions/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
    Json(payload): Json<PositionUpdate>,
) -> AppResult<Json<Position>> {
    let mut position: Position = state.store.require(id)?;

    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.external_id, "external_id", MAX_SHORT_TEXT_LEN)?;
    check_ref::<Department>(&state, payload.department_id, "department_id")?;

    position.apply(payload);
    state.store.update(&position)?;
    audit_log!(state.store, user.username, "update", RESOURCE, "id={}", id)?;
    Ok(Json(position))
}
