//! Import API Handlers

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;

use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::reconcile::ImportReport;
use crate::utils::AppResult;

const RESOURCE: &str = "import";

#[derive(Debug, Default, Deserialize)]
pub struct ImportQuery {
    /// Open hire/fire requests for status transitions
    #[serde(default)]
    pub create_hr_requests: bool,
}

#[derive(Debug, Deserialize)]
pub struct DirectoryImport {
    #[serde(default)]
    pub create_hr_requests: bool,
    /// Move cleanly imported files to `processed/`
    #[serde(default = "default_archive")]
    pub archive: bool,
}

impl Default for DirectoryImport {
    fn default() -> Self {
        Self {
            create_hr_requests: false,
            archive: default_archive(),
        }
    }
}

fn default_archive() -> bool {
    true
}

fn summary(report: &ImportReport) -> String {
    format!(
        "departments={:?} positions={:?} employees={:?} errors={}",
        report.departments,
        report.positions,
        report.employees,
        report.errors.len()
    )
}

/// POST /api/import/json?create_hr_requests=
///
/// Record-level errors go into the report; the status stays 200.
pub async fn import_json(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ImportQuery>,
    Json(payload): Json<Value>,
) -> AppResult<Json<ImportReport>> {
    let report = state
        .reconciler
        .import_value(payload, query.create_hr_requests)
        .await;
    audit_log!(state.store, user.username, "import", RESOURCE, "json: {}", summary(&report))?;
    Ok(Json(report))
}

/// POST /api/import/directory
///
/// The body is optional. By default no requests are opened and imported files are archived.
pub async fn import_directory(
    State(state): State<ServerState>,
    user: CurrentUser,
    payload: Option<Json<DirectoryImport>>,
) -> AppResult<Json<BTreeMap<String, ImportReport>>> {
    let Json(options) = payload.unwrap_or_default();
    let dir = state.import_dir();
    let reports = state
        .reconciler
        .import_directory(&dir, options.create_hr_requests, options.archive)
        .await?;

    let failed = reports.values().filter(|r| !r.is_clean()).count();
    audit_log!(
        state.store,
        user.username,
        "import",
        RESOURCE,
        "directory {}: files={} with_errors={}",
        dir.display(),
        reports.len(),
        failed
    )?;
    Ok(Json(reports))
}
