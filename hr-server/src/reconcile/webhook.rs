//! Push events from the payroll system
//!
//! `hire` and `fire` arrive either wrapped in a [`PayrollEvent`] envelope
//! (webhook) or as bare bodies on their own routes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{Employee, EmployeeStatus};

use super::Reconciler;
use super::fields::parse_date;
use crate::store::StoreError;

/// Webhook envelope `{event_type, data}`
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollEvent {
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HireEvent {
    /// External id of the employee in the payroll system
    pub employee_id: String,
    pub full_name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub effective_date: Option<String>,
    #[serde(default = "default_true")]
    pub needs_it_equipment: bool,
    #[serde(default)]
    pub pass_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FireEvent {
    pub employee_id: String,
    #[serde(default)]
    pub effective_date: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventOutcome {
    pub employee_id: u64,
    pub hr_request_id: u64,
    pub ticket_created: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("{0}")]
    Validation(String),

    #[error("Employee not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Unparseable dates fall back to "today" downstream
fn lenient_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| parse_date(s).ok().flatten())
}

impl Reconciler {
    /// Dispatch a webhook envelope by `event_type` (case-insensitive)
    pub async fn handle_event(&self, event: PayrollEvent, today: NaiveDate) -> Result<EventOutcome, EventError> {
        let kind = event.event_type.to_lowercase();
        match kind.as_str() {
            "hire" => {
                let hire: HireEvent = serde_json::from_value(event.data)
                    .map_err(|e| EventError::Validation(format!("invalid hire event: {}", e)))?;
                self.hire_event(hire, today).await
            }
            "fire" => {
                let fire: FireEvent = serde_json::from_value(event.data)
                    .map_err(|e| EventError::Validation(format!("invalid fire event: {}", e)))?;
                self.fire_event(fire, today).await
            }
            other => Err(EventError::Validation(format!(
                "unknown event type '{}', expected hire or fire",
                other
            ))),
        }
    }

    /// Find or create the employee (as candidate) and open a hire request
    pub async fn hire_event(&self, event: HireEvent, today: NaiveDate) -> Result<EventOutcome, EventError> {
        let external_id = event.employee_id.trim();
        let full_name = event.full_name.trim();
        if external_id.is_empty() || full_name.is_empty() {
            return Err(EventError::Validation("employee_id and full_name are required".into()));
        }

        let employee = match self.store.find_by_external_id::<Employee>(external_id)? {
            Some(existing) => existing,
            None => {
                let mut employee = Employee::new(full_name);
                employee.external_id = Some(external_id.to_string());
                employee.status = EmployeeStatus::Candidate;
                if let Some(name) = event.department.as_deref() {
                    employee.department_id = self.store.find_department_by_name(name)?.map(|d| d.id);
                }
                if let Some(name) = event.position.as_deref() {
                    employee.position_id = self.store.find_position_by_name(name)?.map(|p| p.id);
                }
                let employee = self.store.insert(employee)?;
                tracing::info!(target: "payroll", employee_id = employee.id, external_id, "Employee created from hire event");
                employee
            }
        };
        let effective = lenient_date(event.effective_date.as_deref());
        let pass_number = event
            .pass_number
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let synthesized = self
            .open_hire_request(&employee, effective, event.needs_it_equipment, pass_number, today)
            .await?;
        Ok(EventOutcome {
            employee_id: employee.id,
            hr_request_id: synthesized.request.id,
            ticket_created: synthesized.ticket_created,
        })
    }

    /// Open a fire request for a known employee
    pub async fn fire_event(&self, event: FireEvent, today: NaiveDate) -> Result<EventOutcome, EventError> {
        let external_id = event.employee_id.trim();
        let employee = self
            .store
            .find_by_external_id::<Employee>(external_id)?
            .ok_or_else(|| EventError::NotFound(external_id.to_string()))?;

        let effective = lenient_date(event.effective_date.as_deref());
        let synthesized = self.open_fire_request(&employee, effective, today).await?;
        Ok(EventOutcome {
            employee_id: employee.id,
            hr_request_id: synthesized.request.id,
            ticket_created: synthesized.ticket_created,
        })
    }
}
