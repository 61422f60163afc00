//! Payroll API Handlers

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use ring::hmac;
use serde::{Deserialize, Serialize};

use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::reconcile::{EventOutcome, FireEvent, HireEvent, ImportReport, PayrollEvent};
use crate::security_log;
use crate::utils::time::today;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "payroll";

/// Webhook shared-secret header
pub const TOKEN_HEADER: &str = "x-payroll-token";

/// Audit user for webhook calls
const WEBHOOK_ACTOR: &str = "payroll";

/// Both tokens are MACed under one fixed key so the comparison runs in
/// constant time whatever their lengths.
const TOKEN_MAC_KEY: &[u8] = b"hr-desk payroll webhook";

#[derive(Debug, Default, Deserialize)]
pub struct SyncQuery {
    #[serde(default)]
    pub create_hr_requests: bool,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    pub result: EventOutcome,
}

fn token_matches(expected: &str, provided: &str) -> bool {
    let key = hmac::Key::new(hmac::HMAC_SHA256, TOKEN_MAC_KEY);
    let expected_tag = hmac::sign(&key, expected.as_bytes());
    hmac::verify(&key, provided.as_bytes(), expected_tag.as_ref()).is_ok()
}

/// Check `X-Payroll-Token` when a webhook token is configured
fn verify_webhook_token(state: &ServerState, headers: &HeaderMap) -> AppResult<()> {
    let Some(expected) = state.config.integrations.payroll_webhook_token.as_deref() else {
        return Ok(());
    };
    let provided = headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if provided.is_empty() || !token_matches(expected, provided) {
        security_log!("WARN", "webhook_token_rejected", present = !provided.is_empty());
        return Err(AppError::invalid_token("Invalid webhook token"));
    }
    Ok(())
}

fn summary(report: &ImportReport) -> String {
    format!(
        "departments={:?} positions={:?} employees={:?} errors={}",
        report.departments,
        report.positions,
        report.employees,
        report.errors.len()
    )
}

/// POST /api/payroll/sync/all?create_hr_requests= - departments, positions, then employees
pub async fn sync_all(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<SyncQuery>,
) -> AppResult<Json<ImportReport>> {
    let report = state.reconciler.sync_all(query.create_hr_requests).await?;
    audit_log!(state.store, user.username, "sync", RESOURCE, "all: {}", summary(&report))?;
    Ok(Json(report))
}

/// POST /api/payroll/sync/departments
pub async fn sync_departments(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ImportReport>> {
    let report = state.reconciler.sync_departments().await?;
    audit_log!(state.store, user.username, "sync", RESOURCE, "departments: {}", summary(&report))?;
    Ok(Json(report))
}

/// POST /api/payroll/sync/positions
pub async fn sync_positions(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ImportReport>> {
    let report = state.reconciler.sync_positions().await?;
    audit_log!(state.store, user.username, "sync", RESOURCE, "positions: {}", summary(&report))?;
    Ok(Json(report))
}

/// POST /api/payroll/sync/employees?create_hr_requests=
pub async fn sync_employees(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<SyncQuery>,
) -> AppResult<Json<ImportReport>> {
    let report = state
        .reconciler
        .sync_employees(query.create_hr_requests)
        .await?;
    audit_log!(state.store, user.username, "sync", RESOURCE, "employees: {}", summary(&report))?;
    Ok(Json(report))
}

/// POST /api/payroll/webhook - hire/fire events pushed by the payroll system
pub async fn webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(event): Json<PayrollEvent>,
) -> AppResult<Json<EventResponse>> {
    verify_webhook_token(&state, &headers)?;

    let event_type = event.event_type.to_lowercase();
    let result = state.reconciler.handle_event(event, today()).await?;
    audit_log!(
        state.store,
        WEBHOOK_ACTOR,
        "event",
        RESOURCE,
        "{}: employee_id={} hr_request_id={}",
        event_type,
        result.employee_id,
        result.hr_request_id
    )?;
    Ok(Json(EventResponse {
        status: "ok",
        event: Some(event_type),
        result,
    }))
}

/// POST /api/payroll/event/hire
pub async fn hire_event(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(event): Json<HireEvent>,
) -> AppResult<Json<EventResponse>> {
    let result = state.reconciler.hire_event(event, today()).await?;
    audit_log!(state.store, user.username, "event", RESOURCE, "hire: employee_id={}", result.employee_id)?;
    Ok(Json(EventResponse {
        status: "ok",
        event: None,
        result,
    }))
}

/// POST /api/payroll/event/fire
pub async fn fire_event(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(event): Json<FireEvent>,
) -> AppResult<Json<EventResponse>> {
    let result = state.reconciler.fire_event(event, today()).await?;
    audit_log!(state.store, user.username, "event", RESOURCE, "fire: employee_id={}", result.employee_id)?;
    Ok(Json(EventResponse {
        status: "ok",
        event: None,
        result,
    }))
}
