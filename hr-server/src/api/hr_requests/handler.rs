//! HR Request API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{HrRequest, HrRequestCreate, RequestStatus};

use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::scheduler::SweepReport;
use crate::utils::AppResult;
use crate::utils::time::today;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_optional_text};

const RESOURCE: &str = "hr_request";

#[derive(Debug, Default, Deserialize)]
pub struct RequestQuery {
    pub employee_id: Option<u64>,
    pub status: Option<RequestStatus>,
}

/// GET /api/hr-requests?employee_id=&status=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<Vec<HrRequest>>> {
    let requests = state.store.filter(|r: &HrRequest| {
        query.employee_id.is_none_or(|id| r.employee_id == id)
            && query.status.is_none_or(|s| r.status == s)
    })?;
    Ok(Json(requests))
}

/// POST /api/hr-requests - also opens an intake ticket
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<HrRequestCreate>,
) -> AppResult<Json<HrRequest>> {
    validate_optional_text(&payload.pass_number, "pass_number", MAX_SHORT_TEXT_LEN)?;

    let request = state.lifecycle.create_request(payload).await?;
    audit_log!(
        state.store,
        user.username,
        "create",
        RESOURCE,
        "id={} type={} employee_id={}",
        request.id,
        request.kind,
        request.employee_id
    )?;
    Ok(Json(request))
}

/// POST /api/hr-requests/{id}/process - execute now
pub async fn process(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
) -> AppResult<Json<HrRequest>> {
    let request = state.lifecycle.process(id, today()).await?;
    audit_log!(state.store, user.username, "process", RESOURCE, "id={} type={}", id, request.kind)?;
    Ok(Json(request))
}

/// POST /api/hr-requests/process-due - execute everything due
pub async fn process_due(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<SweepReport>> {
    let report = state.lifecycle.sweep_due(today()).await?;
    audit_log!(
        state.store,
        user.username,
        "process_due",
        RESOURCE,
        "processed={} failed={}",
        report.processed,
        report.failed
    )?;
    Ok(Json(report))
}
