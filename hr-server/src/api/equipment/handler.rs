//! Equipment API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{Employee, Equipment, EquipmentCreate, EquipmentUpdate};

use crate::api::check_ref;
use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};

const RESOURCE: &str = "equipment";

#[derive(Debug, Default, Deserialize)]
pub struct EquipmentQuery {
    pub employee_id: Option<u64>,
}

/// GET /api/equipment?employee_id=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<EquipmentQuery>,
) -> AppResult<Json<Vec<Equipment>>> {
    let items = match query.employee_id {
        Some(employee_id) => state.store.equipment_for_employee(employee_id)?,
        None => state.store.list()?,
    };
    Ok(Json(items))
}

/// POST /api/equipment
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<EquipmentCreate>,
) -> AppResult<Json<Equipment>> {
    validate_required_text(&payload.kind, "type", MAX_NAME_LEN)?;
    validate_optional_text(&payload.serial_number, "serial_number", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.status, "status", MAX_SHORT_TEXT_LEN)?;
    check_ref::<Employee>(&state, payload.employee_id, "employee_id")?;

    let item = state.store.insert(Equipment::from(payload))?;
    audit_log!(state.store, user.username, "create", RESOURCE, "id={} type={}", item.id, item.kind)?;
    Ok(Json(item))
}

/// PATCH /api/equipment/{id} - status or holder
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
    Json(payload): Json<EquipmentUpdate>,
) -> AppResult<Json<Equipment>> {
    let mut item: Equipment = state.store.require(id)?;

    if let Some(kind) = &payload.kind {
        validate_required_text(kind, "type", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.serial_number, "serial_number", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.status, "status", MAX_SHORT_TEXT_LEN)?;
    check_ref::<Employee>(&state, payload.employee_id, "employee_id")?;

    item.apply(payload);
    state.store.update(&item)?;
    audit_log!(state.store, user.username, "update", RESOURCE, "id={} status={}", id, item.status)?;
    Ok(Json(item))
}
