//! HR request lifecycle
//!
//! Processing a request runs the downstream provisioning (hire) or
//! deprovisioning (fire) calls, then commits the employee, request and IT
//! account changes in one write transaction. Gateway failures are logged
//! and never stop a request from reaching `done`.

mod fire;
mod hire;

use std::sync::Arc;

use chrono::NaiveDate;
use redb::WriteTransaction;
use shared::models::{Employee, HrRequest, HrRequestCreate, ItAccount, RequestKind, RequestStatus};
use tokio::sync::Mutex;

use crate::gateways::{Degrade, Gateways, OwnerRef};
use crate::store::{Store, StoreError};

/// Ticket category for lifecycle tickets
pub const TICKET_CATEGORY: &str = "hr";

/// Ticket category for tickets opened when a request is filed
const INTAKE_TICKET_CATEGORY: &str = "other";

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("Unknown request type: {0}")]
    UnknownType(String),

    #[error("Request {0} is already processed")]
    AlreadyProcessed(u64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Mailboxes and domain used by provisioning
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    pub email_domain: String,
    /// Welcome mail recipient when the employee has no address
    pub hr_mailbox: String,
    /// Recipient of unreturned-equipment warnings
    pub it_mailbox: String,
}

/// State changes produced by processing, committed together
#[derive(Debug)]
struct Changes {
    employee: Employee,
    new_accounts: Vec<ItAccount>,
    updated_accounts: Vec<ItAccount>,
}

impl Changes {
    fn for_employee(employee: Employee) -> Self {
        Self {
            employee,
            new_accounts: Vec::new(),
            updated_accounts: Vec::new(),
        }
    }

    fn commit(self, txn: &WriteTransaction, request: &HrRequest) -> Result<(), StoreError> {
        Store::update_in(txn, &self.employee)?;
        for account in self.new_accounts {
            Store::insert_in(txn, account)?;
        }
        for account in &self.updated_accounts {
            Store::update_in(txn, account)?;
        }
        Store::update_in(txn, request)
    }
}

#[derive(Clone)]
pub struct Lifecycle {
    store: Store,
    gateways: Gateways,
    settings: Arc<LifecycleSettings>,
    /// Serializes processing between interactive calls and the sweep
    lock: Arc<Mutex<()>>,
}

impl Lifecycle {
    pub fn new(store: Store, gateways: Gateways, settings: LifecycleSettings) -> Self {
        Self {
            store,
            gateways,
            settings: Arc::new(settings),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Process one request and mark it done
    pub async fn process(&self, request_id: u64, today: NaiveDate) -> LifecycleResult<HrRequest> {
        let _guard = self.lock.lock().await;

        let mut request: HrRequest = self
            .store
            .get(request_id)?
            .ok_or(LifecycleError::NotFound { entity: "hr_request", id: request_id })?;
        let employee: Employee = self
            .store
            .get(request.employee_id)?
            .ok_or(LifecycleError::NotFound { entity: "employee", id: request.employee_id })?;
        if request.is_done() {
            return Err(LifecycleError::AlreadyProcessed(request.id));
        }

        let changes = match &request.kind {
            RequestKind::Hire => self.hire(&request, employee).await,
            RequestKind::Fire => self.fire(employee).await?,
            RequestKind::Other(kind) => return Err(LifecycleError::UnknownType(kind.clone())),
        };

        request.status = RequestStatus::Done;
        request.request_date.get_or_insert(today);
        self.store.write(|txn| changes.commit(txn, &request))?;

        tracing::info!(
            request_id = request.id,
            kind = %request.kind,
            employee_id = request.employee_id,
            "HR request processed"
        );
        Ok(request)
    }

    /// File a new request and open the intake ticket
    pub async fn create_request(&self, data: HrRequestCreate) -> LifecycleResult<HrRequest> {
        let employee: Employee = self
            .store
            .get(data.employee_id)?
            .ok_or(LifecycleError::NotFound { entity: "employee", id: data.employee_id })?;
        let request = self.store.insert(HrRequest::from(data))?;

        match &request.kind {
            RequestKind::Hire if request.needs_it_equipment => {
                let email = shared::naming::corporate_email(&employee.full_name, &self.settings.email_domain);
                let description = format!(
                    "HR: провести онбординг сотрудника.\nФИО: {}\nEmail: {}\nДата выхода: {}\n",
                    employee.full_name,
                    email,
                    display_date(request.effective_date),
                );
                self.ticket(&format!("Онбординг: {}", employee.full_name), &description, INTAKE_TICKET_CATEGORY)
                    .await;
            }
            RequestKind::Fire => {
                let equipment = self.ticketing_equipment(&employee).await;
                let lines = equipment
                    .iter()
                    .map(|item| format!("- {}", describe_equipment(item)))
                    .collect::<Vec<_>>()
                    .join("\n");
                let description = format!(
                    "HR: увольнение сотрудника.\nФИО: {}\nДата увольнения: {}\nОборудование:\n{}",
                    employee.full_name,
                    display_date(request.effective_date),
                    if lines.is_empty() { "Нет данных" } else { lines.as_str() },
                );
                self.ticket(&format!("Увольнение: {}", employee.full_name), &description, INTAKE_TICKET_CATEGORY)
                    .await;
            }
            _ => {}
        }

        tracing::info!(request_id = request.id, kind = %request.kind, "HR request created");
        Ok(request)
    }

    async fn ticket(&self, title: &str, description: &str, category: &str) -> bool {
        self.gateways
            .ticketing
            .create_ticket(title, description, category)
            .await
            .logged("create_ticket")
            .is_some()
    }

    async fn ticketing_equipment(&self, employee: &Employee) -> Vec<serde_json::Value> {
        let owner = OwnerRef {
            employee_id: employee.id,
            email: employee.email().map(str::to_string),
        };
        self.gateways
            .ticketing
            .fetch_equipment_for(&owner)
            .await
            .degrade("fetch_equipment")
    }
}

fn display_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "не указана".to_string(), |d| d.to_string())
}

fn first_text(item: &serde_json::Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| item.get(*k).and_then(|v| v.as_str()).filter(|s| !s.is_empty()))
        .unwrap_or("?")
        .to_string()
}

/// `name (inventory number)` from a ticketing equipment item
fn describe_equipment(item: &serde_json::Value) -> String {
    format!(
        "{} ({})",
        first_text(item, &["name", "type"]),
        first_text(item, &["inventory_number", "serial_number"])
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::*;
    use crate::gateways::fake::FakeGateways;

    pub fn settings() -> LifecycleSettings {
        LifecycleSettings {
            email_domain: "corp.org".into(),
            hr_mailbox: "hr@corp.org".into(),
            it_mailbox: "it@corp.org".into(),
        }
    }

    pub fn lifecycle_with(fake: FakeGateways) -> (Lifecycle, Arc<FakeGateways>) {
        let fake = Arc::new(fake);
        let store = Store::open_in_memory().unwrap();
        (
            Lifecycle::new(store, FakeGateways::bundle(&fake), settings()),
            fake,
        )
    }

    pub fn lifecycle() -> (Lifecycle, Arc<FakeGateways>) {
        lifecycle_with(FakeGateways::default())
    }

    pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn request(lc: &Lifecycle, kind: RequestKind, employee_id: u64, equipment: bool) -> HrRequest {
        let mut r = HrRequest::new(kind, employee_id);
        r.needs_it_equipment = equipment;
        r.effective_date = Some(day(2024, 2, 1));
        lc.store().insert(r).unwrap()
    }
}
