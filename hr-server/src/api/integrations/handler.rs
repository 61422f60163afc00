//! Integration sync API Handlers
//!
//! The sync jobs write their own audit entries.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::Equipment;
use shared::naming::AccountHandles;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::sync::{PullReport, PushReport, TicketingHealth};
use crate::utils::AppResult;
use crate::utils::validation::{MAX_FULL_NAME_LEN, validate_required_text};

#[derive(Debug, Default, Deserialize)]
pub struct PushQuery {
    /// Create ticketing users for employees without a match
    #[serde(default)]
    pub create_missing: bool,
}

/// GET /api/integrations/ticketing/health
pub async fn ticketing_health(State(state): State<ServerState>) -> Json<TicketingHealth> {
    Json(state.integrations.ticketing_health().await)
}

/// POST /api/integrations/ticketing/pull-users
pub async fn pull_ticketing_users(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<PullReport>> {
    Ok(Json(
        state.integrations.pull_ticketing_users(&user.username).await?,
    ))
}

/// POST /api/integrations/ticketing/push-contacts?create_missing=
pub async fn push_ticketing_contacts(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<PushQuery>,
) -> AppResult<Json<PushReport>> {
    Ok(Json(
        state
            .integrations
            .push_ticketing_contacts(&user.username, query.create_missing)
            .await?,
    ))
}

/// POST /api/integrations/ticketing/sync-all
///
/// Push every active employee, creating missing ticketing users.
pub async fn sync_all_ticketing_contacts(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<PushReport>> {
    Ok(Json(
        state
            .integrations
            .push_ticketing_contacts(&user.username, true)
            .await?,
    ))
}

/// POST /api/integrations/ticketing/equipment/{employee_id}
pub async fn pull_equipment(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(employee_id): Path<u64>,
) -> AppResult<Json<Vec<Equipment>>> {
    Ok(Json(
        state
            .integrations
            .pull_equipment(&user.username, employee_id)
            .await?,
    ))
}

/// POST /api/integrations/directory/pull-users
pub async fn pull_directory_users(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<PullReport>> {
    Ok(Json(
        state.integrations.pull_directory_users(&user.username).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct ProvisionQuery {
    pub full_name: String,
}

/// POST /api/integrations/directory/provision?full_name=
///
/// Handles a hire with this name would get. Nothing is created.
pub async fn preview_handles(
    State(state): State<ServerState>,
    Query(query): Query<ProvisionQuery>,
) -> AppResult<Json<AccountHandles>> {
    validate_required_text(&query.full_name, "full_name", MAX_FULL_NAME_LEN)?;
    Ok(Json(AccountHandles::for_name(
        &query.full_name,
        &state.config.email_domain,
    )))
}
