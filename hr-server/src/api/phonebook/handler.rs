//! Phonebook API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{Employee, EmployeeStatus};

use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Default, Deserialize)]
pub struct PhonebookQuery {
    /// Case-insensitive substring of the full name
    pub q: Option<String>,
    pub department_id: Option<u64>,
}

/// Contact fields only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhonebookEntry {
    pub id: u64,
    pub full_name: String,
    pub internal_phone: Option<String>,
    pub external_phone: Option<String>,
    pub email: Option<String>,
    pub department_id: Option<u64>,
    pub position_id: Option<u64>,
}

impl From<Employee> for PhonebookEntry {
    fn from(e: Employee) -> Self {
        Self {
            id: e.id,
            full_name: e.full_name,
            internal_phone: e.internal_phone,
            external_phone: e.external_phone,
            email: e.email,
            department_id: e.department_id,
            position_id: e.position_id,
        }
    }
}

/// GET /api/phonebook?q=&department_id= - sorted by name, dismissed staff excluded
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PhonebookQuery>,
) -> AppResult<Json<Vec<PhonebookEntry>>> {
    let mut entries: Vec<PhonebookEntry> = state
        .store
        .search_employees(query.q.as_deref(), query.department_id)?
        .into_iter()
        .filter(|e| e.status != EmployeeStatus::Dismissed)
        .map(PhonebookEntry::from)
        .collect();
    entries.sort_by(|a, b| a.full_name.cmp(&b.full_name));
    Ok(Json(entries))
}
