//! Axum middleware for JWT authentication and role checks

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::{HeaderMap, Uri};

use crate::AppError;
use crate::auth::permissions::is_known_role;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// Paths authenticated by a shared-secret header instead of a JWT
const SHARED_SECRET_ROUTES: &[&str] = &["/api/payroll/webhook"];

type GuardFuture = Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>;

/// CORS preflight, anything outside `/api/`, and shared-secret paths skip JWT checks
fn is_public(req: &Request) -> bool {
    let path = req.uri().path();
    req.method() == http::Method::OPTIONS
        || !path.starts_with("/api/")
        || SHARED_SECRET_ROUTES.contains(&path)
}

/// Resolves the caller from `Authorization: Bearer <token>`
///
/// | Failure | Response |
/// |---------|----------|
/// | no Authorization header | 401 E3001 |
/// | not Bearer, or invalid token | 401 E3002 |
/// | expired token | 401 E3003 |
pub(crate) fn authenticate(
    state: &ServerState,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<CurrentUser, AppError> {
    let Some(header) = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        security_log!("WARN", "auth_missing", uri = uri.path());
        return Err(AppError::unauthorized());
    };

    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    let user = state
        .get_jwt_service()
        .validate_token(token)
        .map(CurrentUser::from)
        .map_err(|e| {
            security_log!("WARN", "auth_failed", error = e.to_string(), uri = uri.path());
            match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            }
        })?;

    if !is_known_role(&user.role) {
        security_log!(
            "WARN",
            "unknown_role",
            username = user.username.as_str(),
            role = user.role.as_str()
        );
    }
    Ok(user)
}

/// Authentication middleware: every `/api/` path except the webhook needs a valid token
///
/// On success the [`CurrentUser`] goes into request extensions for
/// [`require_roles`] and handler `CurrentUser` arguments.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if is_public(&req) {
        return Ok(next.run(req).await);
    }

    let user = authenticate(&state, req.headers(), req.uri())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Role check middleware: any of `roles` passes, and `admin` always does
///
/// ```ignore
/// Router::new()
///     .route("/api/equipment", post(handler::create))
///     .layer(middleware::from_fn(require_roles(permissions::EQUIPMENT_WRITE)));
/// ```
///
/// Anything else gets 403 E2001
pub fn require_roles(
    roles: &'static [&'static str],
) -> impl Fn(Request, Next) -> GuardFuture + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !user.has_any_role(roles) {
                security_log!(
                    "WARN",
                    "role_denied",
                    username = user.username.as_str(),
                    role = user.role.as_str(),
                    required = roles.join(",")
                );
                return Err(AppError::forbidden(format!(
                    "Role '{}' is not allowed here",
                    user.role
                )));
            }

            Ok(next.run(req).await)
        })
    }
}
