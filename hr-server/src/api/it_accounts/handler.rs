//! IT Account API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::ItAccount;

use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Default, Deserialize)]
pub struct AccountQuery {
    pub employee_id: Option<u64>,
}

/// GET /api/it-accounts?employee_id=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AccountQuery>,
) -> AppResult<Json<Vec<ItAccount>>> {
    let accounts = match query.employee_id {
        Some(employee_id) => state.store.accounts_for_employee(employee_id)?,
        None => state.store.list()?,
    };
    Ok(Json(accounts))
}
