//! Department API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Department, DepartmentCreate, DepartmentUpdate, Employee};

use crate::api::check_ref;
use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "department";

/// `parent_id` must not be `id` itself or one of its descendants
fn check_parent(state: &ServerState, id: u64, parent_id: u64) -> AppResult<()> {
    let mut cursor = Some(parent_id);
    while let Some(current) = cursor {
        if current == id {
            return Err(AppError::validation(format!(
                "department {} cannot be placed under its own subtree",
                id
            )));
        }
        cursor = state
            .store
            .get::<Department>(current)?
            .and_then(|d| d.parent_department_id);
    }
    Ok(())
}

/// GET /api/departments
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Department>>> {
    Ok(Json(state.store.list()?))
}

/// POST /api/departments
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<DepartmentCreate>,
) -> AppResult<Json<Department>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.external_id, "external_id", MAX_SHORT_TEXT_LEN)?;
    check_ref::<Department>(&state, payload.parent_department_id, "parent_department_id")?;
    check_ref::<Employee>(&state, payload.manager_id, "manager_id")?;

    let department = state.store.insert(Department::from(payload))?;
    audit_log!(state.store, user.username, "create", RESOURCE, "id={} name={}", department.id, department.name)?;
    Ok(Json(department))
}

/// PATCH /api/departments/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
    Json(payload): Json<DepartmentUpdate>,
) -> AppResult<Json<Department>> {
    let mut department: Department = state.store.require(id)?;

    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.external_id, "external_id", MAX_SHORT_TEXT_LEN)?;
    check_ref::<Department>(&state, payload.parent_department_id, "parent_department_id")?;
    check_ref::<Employee>(&state, payload.manager_id, "manager_id")?;
    if let Some(parent_id) = payload.parent_department_id {
        check_parent(&state, id, parent_id)?;
    }

    department.apply(payload);
    state.store.update(&department)?;
    audit_log!(state.store, user.username, "update", RESOURCE, "id={}", id)?;
    Ok(Json(department))
}

/// DELETE /api/departments/{id} - refused while child departments exist
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
) -> AppResult<Json<bool>> {
    state.store.delete_department(id)?;
    audit_log!(state.store, user.username, "delete", RESOURCE, "id={}", id)?;
    Ok(Json(true))
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::*;

    #[tokio::test]
    async fn test_create_and_list() {
        let state = state();
        let (status, root) = call(&state, "POST", "/api/departments", Some("hr"), Some(json!({"name": "Root"}))).await;
        assert_eq!(status, StatusCode::OK);

        let child = json!({"name": "Child", "parent_department_id": root["id"]});
        let (status, _) = call(&state, "POST", "/api/departments", Some("hr"), Some(child)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, list) = call(&state, "GET", "/api/departments", Some("manager"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 2);

        let audit = state.store.recent_audit(10).unwrap();
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[0].user, "hr-user");
    }

    #[tokio::test]
    async fn test_write_requires_hr() {
        let state = state();
        let (status, body) = call(&state, "POST", "/api/departments", Some("it"), Some(json!({"name": "X"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "E2001");

        let (status, _) = call(&state, "POST", "/api/departments", Some("admin"), Some(json!({"name": "X"}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reject_blank_name_and_dangling_parent() {
        let state = state();
        let (status, _) = call(&state, "POST", "/api/departments", Some("hr"), Some(json!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body = json!({"name": "A", "parent_department_id": 99});
        let (status, _) = call(&state, "POST", "/api/departments", Some("hr"), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_rejects_cycle() {
        let state = state();
        let (_, root) = call(&state, "POST", "/api/departments", Some("hr"), Some(json!({"name": "Root"}))).await;
        let (_, child) = call(
            &state,
            "POST",
            "/api/departments",
            Some("hr"),
            Some(json!({"name": "Child", "parent_department_id": root["id"]})),
        )
        .await;

        let uri = format!("/api/departments/{}", root["id"]);
        let (status, _) = call(&state, "PATCH", &uri, Some("hr"), Some(json!({"parent_department_id": child["id"]}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, renamed) = call(&state, "PATCH", &uri, Some("hr"), Some(json!({"name": "Head office"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["name"], "Head office");
    }

    #[tokio::test]
    async fn test_delete_parent_conflicts() {
        let state = state();
        let (_, root) = call(&state, "POST", "/api/departments", Some("hr"), Some(json!({"name": "Root"}))).await;
        let (_, child) = call(
            &state,
            "POST",
            "/api/departments",
            Some("hr"),
            Some(json!({"name": "Child", "parent_department_id": root["id"]})),
        )
        .await;

        let (status, _) = call(&state, "DELETE", &format!("/api/departments/{}", root["id"]), Some("hr"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(&state, "DELETE", &format!("/api/departments/{}", child["id"]), Some("hr"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&state, "DELETE", &format!("/api/departments/{}", child["id"]), Some("hr"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
