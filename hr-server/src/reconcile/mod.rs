//! Reconciliation engine
//!
//! Merges externally sourced departments, positions and employees into the
//! store, keyed by external id. Kinds run in fixed order
//! (department → position → employee) so later kinds can resolve
//! references to earlier ones. Within a kind, references are resolved in a
//! second pass, so a child may appear before its parent.
//!
//! Imports never fail as a whole: each rejected record adds one line to
//! [`ImportReport::errors`] and the batch continues.

mod departments;
mod employees;
pub mod fields;
mod files;
mod payroll;
mod positions;
mod synthesis;
pub mod webhook;

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::gateways::Gateways;
use crate::store::Store;

pub use files::ImportError;
pub use payroll::PayrollSyncError;
pub use webhook::{EventError, EventOutcome, FireEvent, HireEvent, PayrollEvent};

/// One import payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportBatch {
    #[serde(default)]
    pub departments: Vec<Value>,
    #[serde(default)]
    pub positions: Vec<Value>,
    #[serde(default)]
    pub employees: Vec<Value>,
}

/// Per-kind counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub created: usize,
    pub updated: usize,
    pub errors: usize,
}

/// Outcome of one import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub departments: KindCounts,
    pub positions: KindCounts,
    pub employees: KindCounts,
    pub hire_requests_created: usize,
    pub fire_requests_created: usize,
    pub errors: Vec<String>,
}

impl ImportReport {
    /// Report carrying a single payload-level error
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Default::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Department,
    Position,
    Employee,
}

impl Kind {
    fn label(self) -> &'static str {
        match self {
            Kind::Department => "department",
            Kind::Position => "position",
            Kind::Employee => "employee",
        }
    }

    fn counts(self, report: &mut ImportReport) -> &mut KindCounts {
        match self {
            Kind::Department => &mut report.departments,
            Kind::Position => &mut report.positions,
            Kind::Employee => &mut report.employees,
        }
    }
}

/// external id → local id, for records seen in the current batch
#[derive(Debug, Default)]
struct BatchMaps {
    departments: HashMap<String, u64>,
    positions: HashMap<String, u64>,
    employees: HashMap<String, u64>,
}

/// Record a rejected record and keep going
fn reject(report: &mut ImportReport, kind: Kind, who: &str, reason: impl std::fmt::Display) {
    kind.counts(report).errors += 1;
    let line = format!("{} {}: {}", kind.label(), who, reason);
    tracing::warn!(target: "import", "{}", line);
    report.errors.push(line);
}

/// The objects of one kind, rejecting anything else
fn objects<'a>(
    records: &'a [Value],
    kind: Kind,
    report: &mut ImportReport,
) -> Vec<(usize, &'a Map<String, Value>)> {
    let mut out = Vec::with_capacity(records.len());
    for (i, value) in records.iter().enumerate() {
        match value.as_object() {
            Some(record) => out.push((i, record)),
            None => reject(report, kind, &format!("#{}", i), "not a JSON object"),
        }
    }
    out
}

/// Import and sync engine
#[derive(Clone)]
pub struct Reconciler {
    store: Store,
    gateways: Gateways,
    email_domain: String,
}

impl Reconciler {
    pub fn new(store: Store, gateways: Gateways, email_domain: impl Into<String>) -> Self {
        Self {
            store,
            gateways,
            email_domain: email_domain.into(),
        }
    }

    /// Merge a batch into the store
    pub async fn import_batch(&self, batch: &ImportBatch, create_hr_requests: bool) -> ImportReport {
        self.import_batch_on(batch, create_hr_requests, crate::utils::time::today())
            .await
    }

    /// Same as [`import_batch`](Self::import_batch) with an explicit "today"
    pub async fn import_batch_on(
        &self,
        batch: &ImportBatch,
        create_hr_requests: bool,
        today: NaiveDate,
    ) -> ImportReport {
        let mut report = ImportReport::default();
        let mut maps = BatchMaps::default();

        self.import_departments(&batch.departments, &mut maps, &mut report);
        self.import_positions(&batch.positions, &mut maps, &mut report);
        self.import_employees(
            &batch.employees,
            &mut maps,
            &mut report,
            create_hr_requests,
            today,
        )
        .await;

        tracing::info!(
            target: "import",
            departments = ?report.departments,
            positions = ?report.positions,
            employees = ?report.employees,
            hire_requests = report.hire_requests_created,
            fire_requests = report.fire_requests_created,
            errors = report.errors.len(),
            "Import finished"
        );
        report
    }
}
