//! Audit Log API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::AuditEntry;

use crate::core::ServerState;
use crate::utils::AppResult;

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;

#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<usize>,
    pub user: Option<String>,
    pub entity: Option<String>,
    pub action: Option<String>,
}

impl AuditQuery {
    fn is_filtered(&self) -> bool {
        self.user.is_some() || self.entity.is_some() || self.action.is_some()
    }

    fn matches(&self, entry: &AuditEntry) -> bool {
        self.user.as_ref().is_none_or(|u| &entry.user == u)
            && self.entity.as_ref().is_none_or(|e| &entry.entity == e)
            && self.action.as_ref().is_none_or(|a| &entry.action == a)
    }
}

/// GET /api/audit?limit=&user=&entity=&action= - newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<Vec<AuditEntry>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    if !query.is_filtered() {
        return Ok(Json(state.store.recent_audit(limit)?));
    }

    let mut entries = state.store.filter(|e: &AuditEntry| query.matches(e))?;
    entries.reverse();
    entries.truncate(limit);
    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use crate::api::test_support::*;

    #[tokio::test]
    async fn test_list_newest_first_with_filters() {
        let state = state();
        state.store.audit("alice", "create", "department", None).unwrap();
        state.store.audit("bob", "update", "employee", None).unwrap();
        state.store.audit("alice", "update", "employee", Some("id=1".into())).unwrap();

        let (status, all) = call(&state, "GET", "/api/audit", Some("auditor"), None).await;
        assert_eq!(status, StatusCode::OK);
        let all = all.as_array().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0]["details"], "id=1");

        let (_, alice) = call(&state, "GET", "/api/audit?user=alice&limit=1", Some("auditor"), None).await;
        let alice = alice.as_array().unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0]["action"], "update");

        let (status, _) = call(&state, "GET", "/api/audit", Some("hr"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
