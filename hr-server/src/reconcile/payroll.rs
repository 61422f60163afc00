//! Pull sync from the payroll system
//!
//! The three catalogs go through the same engine as file imports, so a
//! payroll sync and a dropped JSON file produce identical results.

use super::{ImportBatch, ImportReport, Reconciler};
use crate::gateways::GatewayResult;

#[derive(Debug, thiserror::Error)]
pub enum PayrollSyncError {
    #[error("Payroll source is not configured")]
    NotConfigured,
}

/// Which catalogs a sync pulls
#[derive(Debug, Clone, Copy)]
struct Catalogs {
    departments: bool,
    positions: bool,
    employees: bool,
}

impl Reconciler {
    pub async fn sync_departments(&self) -> Result<ImportReport, PayrollSyncError> {
        self.sync(Catalogs { departments: true, positions: false, employees: false }, false)
            .await
    }

    pub async fn sync_positions(&self) -> Result<ImportReport, PayrollSyncError> {
        self.sync(Catalogs { departments: false, positions: true, employees: false }, false)
            .await
    }

    pub async fn sync_employees(&self, create_hr_requests: bool) -> Result<ImportReport, PayrollSyncError> {
        self.sync(Catalogs { departments: false, positions: false, employees: true }, create_hr_requests)
            .await
    }

    /// Departments, positions and employees in one batch
    pub async fn sync_all(&self, create_hr_requests: bool) -> Result<ImportReport, PayrollSyncError> {
        self.sync(Catalogs { departments: true, positions: true, employees: true }, create_hr_requests)
            .await
    }

    async fn sync(&self, catalogs: Catalogs, create_hr_requests: bool) -> Result<ImportReport, PayrollSyncError> {
        let payroll = &self.gateways.payroll;
        if !payroll.is_configured() {
            return Err(PayrollSyncError::NotConfigured);
        }

        let mut batch = ImportBatch::default();
        let mut fetch_errors = Vec::new();

        if catalogs.departments {
            batch.departments = collect(payroll.fetch_departments().await, "departments", &mut fetch_errors);
        }
        if catalogs.positions {
            batch.positions = collect(payroll.fetch_positions().await, "positions", &mut fetch_errors);
        }
        if catalogs.employees {
            batch.employees = collect(payroll.fetch_employees().await, "employees", &mut fetch_errors);
        }

        let mut report = self.import_batch(&batch, create_hr_requests).await;
        report.errors.splice(0..0, fetch_errors);
        Ok(report)
    }
}

/// Unwrap a fetched catalog; a failure becomes a report line
fn collect(
    result: GatewayResult<Vec<serde_json::Value>>,
    catalog: &str,
    errors: &mut Vec<String>,
) -> Vec<serde_json::Value> {
    match result {
        Ok(items) => {
            tracing::debug!(target: "payroll", catalog, count = items.len(), "Catalog fetched");
            items
        }
        Err(e) => {
            tracing::warn!(target: "payroll", catalog, error = %e, "Catalog fetch failed");
            errors.push(format!("payroll {}: {}", catalog, e));
            Vec::new()
        }
    }
}
