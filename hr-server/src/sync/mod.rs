//! On-demand sync jobs against the ticketing system and the directory
//!
//! Every job returns counts and leaves an audit entry under the acting user.

mod directory;
mod ticketing;

use serde::Serialize;
use shared::models::{Employee, EmployeeStatus};

use crate::gateways::Gateways;
use crate::store::{Store, StoreResult};

pub use ticketing::TicketingHealth;

/// Counts of a pull job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PullReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Counts of a push job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PushReport {
    pub updated: usize,
    pub created: usize,
    pub skipped: usize,
}

#[derive(Clone)]
pub struct IntegrationSync {
    store: Store,
    gateways: Gateways,
}

/// A person as a remote system describes it
struct RemotePerson<'a> {
    email: &'a str,
    full_name: Option<&'a str>,
    phone: Option<&'a str>,
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

impl IntegrationSync {
    pub fn new(store: Store, gateways: Gateways) -> Self {
        Self { store, gateways }
    }

    /// Match by email; update name and phone, or create an active employee
    fn upsert_person(&self, person: RemotePerson<'_>, report: &mut PullReport) -> StoreResult<()> {
        let Some(email) = non_blank(Some(person.email)) else {
            report.skipped += 1;
            return Ok(());
        };
        let full_name = non_blank(person.full_name);
        let phone = non_blank(person.phone);

        match self.store.find_employee_by_email(email)? {
            Some(mut employee) => {
                if let Some(name) = full_name {
                    employee.full_name = name.to_string();
                }
                if let Some(phone) = phone {
                    employee.internal_phone = Some(phone.to_string());
                }
                self.store.update(&employee)?;
                report.updated += 1;
            }
            None => {
                let mut employee = Employee::new(full_name.unwrap_or(email));
                employee.email = Some(email.to_string());
                employee.internal_phone = phone.map(str::to_string);
                employee.status = EmployeeStatus::Active;
                self.store.insert(employee)?;
                report.created += 1;
            }
        }
        Ok(())
    }

    fn audit(&self, actor: &str, action: &str, entity: &str, details: String) -> StoreResult<()> {
        tracing::info!(target: "sync", actor, action, entity, %details, "Sync job finished");
        self.store.audit(actor, action, entity, Some(details))?;
        Ok(())
    }
}
