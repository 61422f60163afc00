//! Employee API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    Department, Employee, EmployeeCreate, EmployeeStatus, EmployeeUpdate, Position,
};

use crate::api::check_ref;
use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::validation::{
    MAX_FULL_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_email, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "employee";

#[derive(Debug, Default, Deserialize)]
pub struct EmployeeQuery {
    /// Substring of the full name, case-insensitive
    pub q: Option<String>,
    pub department_id: Option<u64>,
    pub status: Option<EmployeeStatus>,
}

/// Email must not belong to another employee
fn check_email_free(state: &ServerState, email: Option<&str>, own_id: u64) -> AppResult<()> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };
    match state.store.find_employee_by_email(email)? {
        Some(other) if other.id != own_id => Err(AppError::conflict(format!(
            "email {} already belongs to employee {}",
            email, other.id
        ))),
        _ => Ok(()),
    }
}

fn validate_contacts(
    email: &Option<String>,
    internal_phone: &Option<String>,
    external_phone: &Option<String>,
    pass_number: &Option<String>,
    external_id: &Option<String>,
) -> AppResult<()> {
    validate_optional_email(email)?;
    validate_optional_text(internal_phone, "internal_phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(external_phone, "external_phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(pass_number, "pass_number", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(external_id, "external_id", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

/// GET /api/employees?q=&department_id=&status= - search employees
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<EmployeeQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    let mut employees = state
        .store
        .search_employees(query.q.as_deref(), query.department_id)?;
    if let Some(status) = query.status {
        employees.retain(|e| e.status == status);
    }
    Ok(Json(employees))
}

/// GET /api/employees/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Employee>> {
    Ok(Json(state.store.require(id)?))
}

/// POST /api/employees
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<Employee>> {
    validate_required_text(&payload.full_name, "full_name", MAX_FULL_NAME_LEN)?;
    validate_contacts(
        &payload.email,
        &payload.internal_phone,
        &payload.external_phone,
        &payload.pass_number,
        &payload.external_id,
    )?;
    check_ref::<Department>(&state, payload.department_id, "department_id")?;
    check_ref::<Position>(&state, payload.position_id, "position_id")?;
    check_ref::<Employee>(&state, payload.manager_id, "manager_id")?;
    check_email_free(&state, payload.email.as_deref(), 0)?;

    let employee = state.store.insert(Employee::from(payload))?;
    audit_log!(state.store, user.username, "create", RESOURCE, "id={} name={}", employee.id, employee.full_name)?;
    Ok(Json(employee))
}

/// PATCH /api/employees/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<Employee>> {
    let mut employee: Employee = state.store.require(id)?;

    if let Some(name) = &payload.full_name {
        validate_required_text(name, "full_name", MAX_FULL_NAME_LEN)?;
    }
    validate_contacts(
        &payload.email,
        &payload.internal_phone,
        &payload.external_phone,
        &payload.pass_number,
        &payload.external_id,
    )?;
    check_ref::<Department>(&state, payload.department_id, "department_id")?;
    check_ref::<Position>(&state, payload.position_id, "position_id")?;
    check_ref::<Employee>(&state, payload.manager_id, "manager_id")?;
    if payload.manager_id == Some(id) {
        return Err(AppError::validation("an employee cannot manage themselves"));
    }
    check_email_free(&state, payload.email.as_deref(), id)?;

    employee.apply(payload);
    state.store.update(&employee)?;
    audit_log!(state.store, user.username, "update", RESOURCE, "id={}", id)?;
    Ok(Json(employee))
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::*;

    #[tokio::test]
    async fn test_create_search_and_get() {
        let state = state();
        for name in ["Иванов Иван", "Петров Пётр", "Сидорова Анна"] {
            let (status, _) = call(&state, "POST", "/api/employees", Some("hr"), Some(json!({"full_name": name}))).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, found) = call(&state, "GET", "/api/employees?q=%D0%BF%D0%B5%D1%82%D1%80%D0%BE%D0%B2", Some("auditor"), None).await;
        assert_eq!(status, StatusCode::OK);
        let found = found.as_array().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["full_name"], "Петров Пётр");

        let (status, one) = call(&state, "GET", &format!("/api/employees/{}", found[0]["id"]), Some("it"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(one["status"], "candidate");

        let (status, _) = call(&state, "GET", "/api/employees/999", Some("it"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_filter_by_status() {
        let state = state();
        let body = json!({"full_name": "Иванов Иван", "status": "active"});
        call(&state, "POST", "/api/employees", Some("hr"), Some(body)).await;
        call(&state, "POST", "/api/employees", Some("hr"), Some(json!({"full_name": "Петров Пётр"}))).await;

        let (_, active) = call(&state, "GET", "/api/employees?status=active", Some("hr"), None).await;
        assert_eq!(active.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_email_validation_and_uniqueness() {
        let state = state();
        let body = json!({"full_name": "A B", "email": "not-an-email"});
        let (status, _) = call(&state, "POST", "/api/employees", Some("hr"), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body = json!({"full_name": "A B", "email": "a.b@corp.org"});
        let (status, first) = call(&state, "POST", "/api/employees", Some("hr"), Some(body)).await;
        assert_eq!(status, StatusCode::OK);

        let body = json!({"full_name": "C D", "email": "A.B@corp.org"});
        let (status, _) = call(&state, "POST", "/api/employees", Some("hr"), Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Re-saving one's own address is fine
        let uri = format!("/api/employees/{}", first["id"]);
        let (status, _) = call(&state, "PATCH", &uri, Some("hr"), Some(json!({"email": "a.b@corp.org"}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_update_self_manager_rejected() {
        let state = state();
        let (_, e) = call(&state, "POST", "/api/employees", Some("hr"), Some(json!({"full_name": "A B"}))).await;
        let uri = format!("/api/employees/{}", e["id"]);
        let (status, _) = call(&state, "PATCH", &uri, Some("hr"), Some(json!({"manager_id": e["id"]}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&state, "PATCH", &uri, Some("manager"), Some(json!({"full_name": "X"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
