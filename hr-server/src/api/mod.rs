//! API routes
//!
//! # Layout
//!
//! - [`health`] - health check
//! - [`departments`], [`positions`], [`employees`] - organization records
//! - [`org`] - org chart tree
//! - [`phonebook`], [`birthdays`] - staff directory views
//! - [`equipment`], [`it_accounts`] - IT assets
//! - [`hr_requests`] - hire and fire requests
//! - [`imports`] - JSON imports
//! - [`payroll`] - payroll sync and events
//! - [`integrations`] - ticketing and directory sync
//! - [`audit_log`] - audit trail

pub mod health;

// Organization
pub mod birthdays;
pub mod departments;
pub mod employees;
pub mod org;
pub mod phonebook;
pub mod positions;

// IT
pub mod equipment;
pub mod it_accounts;

// Lifecycle and reconciliation
pub mod hr_requests;
pub mod imports;
pub mod payroll;

pub mod audit_log;
pub mod integrations;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::ServerState;
use crate::store::Record;
use crate::utils::{AppError, AppResult};

// Re-export common types for handlers
pub use crate::utils::AppResponse;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Health API - public route
        .merge(health::router())
        .merge(departments::router())
        .merge(positions::router())
        .merge(employees::router())
        .merge(org::router())
        .merge(phonebook::router())
        .merge(birthdays::router())
        .merge(equipment::router())
        .merge(it_accounts::router())
        .merge(hr_requests::router())
        .merge(imports::router())
        .merge(payroll::router())
        .merge(integrations::router())
        .merge(audit_log::router())
}

/// Build a fully configured application with all middleware and state
///
/// Used by the HTTP server and by router tests
pub fn build_app(state: ServerState) -> Router {
    build_router()
        // Get user context (JWT authentication) - executes before routes, injects CurrentUser
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .with_state(state)
        // ========== Tower HTTP Middleware ==========
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}

/// A referenced record must exist; a dangling id is a client error
pub(crate) fn check_ref<R: Record>(
    state: &ServerState,
    id: Option<u64>,
    field: &str,
) -> AppResult<()> {
    if let Some(id) = id
        && state.store.get::<R>(id)?.is_none()
    {
        return Err(AppError::validation(format!(
            "{field}: {} {id} does not exist",
            R::ENTITY
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::core::{Config, ServerState};
    use crate::gateways::Gateways;
    use crate::store::Store;

    /// State over an in-memory store with nothing configured
    pub fn state() -> ServerState {
        let config = Config::with_overrides("/tmp/hr-desk-test", 0);
        ServerState::new(config, Store::open_in_memory().unwrap(), Gateways::unconfigured()).unwrap()
    }

    pub fn token(state: &ServerState, role: &str) -> String {
        state
            .get_jwt_service()
            .generate_token("1", &format!("{role}-user"), role)
            .unwrap()
    }

    /// Send one request through the full app and decode the JSON body
    pub async fn call(
        state: &ServerState,
        method: &str,
        uri: &str,
        role: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(role) = role {
            builder = builder.header("authorization", format!("Bearer {}", token(state, role)));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = super::build_app(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
