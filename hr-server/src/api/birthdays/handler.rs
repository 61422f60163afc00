//! Birthdays API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::models::{Employee, EmployeeStatus};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct BirthdayQuery {
    /// 1..=12
    pub month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthdayEntry {
    pub id: u64,
    pub full_name: String,
    pub department_id: Option<u64>,
    pub birthday: NaiveDate,
}

/// GET /api/birthdays?month= - current staff with a known birthday, in calendar order
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<BirthdayQuery>,
) -> AppResult<Json<Vec<BirthdayEntry>>> {
    if let Some(month) = query.month
        && !(1..=12).contains(&month)
    {
        return Err(AppError::validation(format!(
            "month must be between 1 and 12, got {}",
            month
        )));
    }

    let mut entries: Vec<BirthdayEntry> = state
        .store
        .filter(|e: &Employee| e.status != EmployeeStatus::Dismissed)?
        .into_iter()
        .filter_map(|e| {
            let birthday = e.birthday?;
            query.month.is_none_or(|m| birthday.month() == m).then(|| BirthdayEntry {
                id: e.id,
                full_name: e.full_name,
                department_id: e.department_id,
                birthday,
            })
        })
        .collect();
    entries.sort_by_key(|e| (e.birthday.month(), e.birthday.day(), e.id));
    Ok(Json(entries))
}
