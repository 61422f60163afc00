//! End-to-end flows through the HTTP API with every external system unconfigured

use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use hr_server::core::ServerError;
use hr_server::{Config, ServerState};
use shared::models::{AccountStatus, Employee, EmployeeStatus, ItAccount};

fn config(dir: &tempfile::TempDir) -> Config {
    Config::with_overrides(dir.path().to_string_lossy(), 0)
}

async fn call(
    state: &ServerState,
    method: &str,
    uri: &str,
    role: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let token = state
        .get_jwt_service()
        .generate_token("42", "tester", role)
        .unwrap();
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token));
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = hr_server::api::build_app(state.clone())
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_import_then_sweep_hires_and_fires() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let state = ServerState::initialize(&config).unwrap();

    let batch = json!({
        "departments": [{"id": "D1", "name": "Отдел продаж"}],
        "positions": [{"id": "P1", "name": "Менеджер", "department_id": "D1"}],
        "employees": [
            {
                "id": "E1",
                "full_name": "Петров Пётр Петрович",
                "department_id": "D1",
                "position_id": "P1",
                "new_hire": true,
                "effective_date": "2020-01-01"
            },
            {"id": "E2", "full_name": "Сидоров Сидор", "dismissed": true}
        ]
    });
    let (status, report) = call(
        &state,
        "POST",
        "/api/import/json?create_hr_requests=true",
        "hr",
        Some(batch),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["employees"]["created"], 2);
    assert_eq!(report["hire_requests_created"], 1);
    assert_eq!(report["fire_requests_created"], 1);

    let (status, sweep) = call(&state, "POST", "/api/hr-requests/process-due", "it", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sweep["processed"], 2);
    assert_eq!(sweep["failed"], 0);

    let employees: Vec<Employee> = state.store.list().unwrap();
    let hired = employees.iter().find(|e| e.full_name.starts_with("Петров")).unwrap();
    assert_eq!(hired.status, EmployeeStatus::Active);
    let expected = shared::naming::corporate_email(&hired.full_name, &config.email_domain);
    assert_eq!(hired.email.as_deref(), Some(expected.as_str()));
    assert!(expected.starts_with("p.p.petrov@"));

    let accounts: Vec<ItAccount> = state.store.accounts_for_employee(hired.id).unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].status, AccountStatus::Active);

    let fired = employees.iter().find(|e| e.full_name.starts_with("Сидоров")).unwrap();
    assert_eq!(fired.status, EmployeeStatus::Dismissed);

    // Nothing left to do
    let (_, sweep) = call(&state, "POST", "/api/hr-requests/process-due", "it", None).await;
    assert_eq!(sweep["processed"], 0);
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let state = ServerState::initialize(&config(&dir)).unwrap();
    let batch = json!({
        "departments": [{"id": "D1", "name": "Root"}, {"id": "D2", "name": "Child", "parent_id": "D1"}],
        "employees": [{"id": "E1", "full_name": "Иванов Иван"}]
    });

    let (_, first) = call(&state, "POST", "/api/import/json", "it", Some(batch.clone())).await;
    assert_eq!(first["departments"]["created"], 2);

    let (_, second) = call(&state, "POST", "/api/import/json", "it", Some(batch)).await;
    assert_eq!(second["departments"]["created"], 0);
    assert_eq!(second["departments"]["updated"], 2);
    assert_eq!(second["employees"]["created"], 0);
    assert_eq!(second["employees"]["updated"], 1);
}

#[tokio::test]
async fn test_data_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    {
        let state = ServerState::initialize(&config).unwrap();
        let (status, _) = call(&state, "POST", "/api/departments", "hr", Some(json!({"name": "Бухгалтерия"}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let state = ServerState::initialize(&config).unwrap();
    let (status, list) = call(&state, "GET", "/api/departments", "auditor", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["name"], "Бухгалтерия");

    let (_, audit) = call(&state, "GET", "/api/audit", "auditor", None).await;
    assert_eq!(audit[0]["user"], "tester");
    assert_eq!(audit[0]["entity"], "department");
}

#[tokio::test]
async fn test_malformed_token_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = ServerState::initialize(&config(&dir)).unwrap();

    let request = Request::builder()
        .uri("/api/employees")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = hr_server::api::build_app(state.clone())
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_short_jwt_secret_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&dir);
    config.jwt.secret = Some("short".to_string());

    let err = ServerState::initialize(&config).unwrap_err();
    assert!(matches!(err, ServerError::Jwt(_)));
}
