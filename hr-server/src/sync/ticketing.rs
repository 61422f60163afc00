use serde::Serialize;
use shared::models::{Department, Employee, EmployeeStatus, Equipment, Position};

use super::{IntegrationSync, PullReport, PushReport, RemotePerson};
use crate::gateways::{Degrade, GatewayError, OwnerRef, UserFields};
use crate::store::StoreResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketingHealth {
    pub status: &'static str,
    pub users_count: usize,
}

/// Identity of a pulled item among the employee's equipment: the serial
/// number, or the lowercased type for items that have none
#[derive(Debug, PartialEq, Eq)]
enum EquipmentKey {
    Serial(String),
    Kind(String),
}

impl EquipmentKey {
    fn of(kind: &str, serial: Option<&str>) -> Self {
        match serial {
            Some(serial) => Self::Serial(serial.to_string()),
            None => Self::Kind(kind.to_lowercase()),
        }
    }
}

fn text_field(item: &serde_json::Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| item.get(*k).and_then(|v| v.as_str()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl IntegrationSync {
    /// Reachability check: `ok` with the user count, `not_configured`, or
    /// `unavailable` when the call failed
    pub async fn ticketing_health(&self) -> TicketingHealth {
        match self.gateways.ticketing.fetch_users().await {
            Ok(users) => TicketingHealth {
                status: "ok",
                users_count: users.len(),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Ticketing health check failed");
                TicketingHealth {
                    status: if e == GatewayError::NotConfigured {
                        "not_configured"
                    } else {
                        "unavailable"
                    },
                    users_count: 0,
                }
            }
        }
    }

    /// Upsert employees by email from ticketing users
    pub async fn pull_ticketing_users(&self, actor: &str) -> StoreResult<PullReport> {
        let users = self.gateways.ticketing.fetch_users().await.degrade("fetch_users");
        let mut report = PullReport::default();
        for user in &users {
            self.upsert_person(
                RemotePerson {
                    email: user.email.as_deref().unwrap_or_default(),
                    full_name: user.full_name.as_deref(),
                    phone: user.phone.as_deref(),
                },
                &mut report,
            )?;
        }
        self.audit(
            actor,
            "sync",
            "employee",
            format!(
                "from ticketing: created={}, updated={}, skipped={}",
                report.created, report.updated, report.skipped
            ),
        )?;
        Ok(report)
    }

    /// Push contact details of active employees to the ticketing system.
    ///
    /// Users are matched by email. Unmatched employees are created when
    /// `create_missing` is set and skipped otherwise.
    pub async fn push_ticketing_contacts(&self, actor: &str, create_missing: bool) -> StoreResult<PushReport> {
        let ticketing = &self.gateways.ticketing;
        let users = ticketing.fetch_users().await.degrade("fetch_users");
        let mut report = PushReport::default();

        for employee in self.store.employees_by_status(EmployeeStatus::Active)? {
            let Some(email) = employee.email() else {
                report.skipped += 1;
                continue;
            };
            let fields = self.contact_fields(&employee)?;
            let remote = users
                .iter()
                .find(|u| u.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email)));

            match remote {
                Some(user) => {
                    let Some(id) = user.id.as_deref() else {
                        report.skipped += 1;
                        continue;
                    };
                    if ticketing.update_user(id, &fields).await.logged("update_user").is_some() {
                        report.updated += 1;
                    }
                }
                None if create_missing => {
                    let fields = UserFields {
                        email: Some(email.to_string()),
                        ..fields
                    };
                    if ticketing.create_user(&fields).await.logged("create_user").is_some() {
                        report.created += 1;
                    }
                }
                None => report.skipped += 1,
            }
        }

        self.audit(
            actor,
            "sync",
            "employee",
            format!(
                "to ticketing: updated={}, created={}, skipped={}",
                report.updated, report.created, report.skipped
            ),
        )?;
        Ok(report)
    }

    fn contact_fields(&self, employee: &Employee) -> StoreResult<UserFields> {
        let department = match employee.department_id {
            Some(id) => self.store.get::<Department>(id)?.map(|d| d.name),
            None => None,
        };
        let position = match employee.position_id {
            Some(id) => self.store.get::<Position>(id)?.map(|p| p.name),
            None => None,
        };
        Ok(UserFields {
            email: None,
            full_name: employee.full_name.clone(),
            department,
            position,
            phone: employee.phone().map(str::to_string),
        })
    }

    /// Record equipment the ticketing system lists for the employee.
    ///
    /// Items already recorded for the employee are not duplicated: same
    /// serial number, or same type when the item has no serial number.
    /// Returns the newly recorded rows.
    pub async fn pull_equipment(&self, actor: &str, employee_id: u64) -> StoreResult<Vec<Equipment>> {
        let employee: Employee = self.store.require(employee_id)?;
        let owner = OwnerRef {
            employee_id,
            email: employee.email().map(str::to_string),
        };
        let items = self
            .gateways
            .ticketing
            .fetch_equipment_for(&owner)
            .await
            .degrade("fetch_equipment");

        let mut known: Vec<EquipmentKey> = self
            .store
            .equipment_for_employee(employee_id)?
            .iter()
            .map(|e| EquipmentKey::of(&e.kind, e.serial_number.as_deref()))
            .collect();

        let mut recorded = Vec::new();
        for item in &items {
            let serial = text_field(item, &["serial_number", "inventory_number"]);
            let kind = text_field(item, &["type", "name"]).unwrap_or_else(|| "unknown".into());
            let key = EquipmentKey::of(&kind, serial.as_deref());
            if known.contains(&key) {
                continue;
            }
            known.push(key);

            let mut equipment = Equipment::new(kind);
            equipment.serial_number = serial;
            if let Some(status) = text_field(item, &["status"]) {
                equipment.status = status;
            }
            equipment.employee_id = Some(employee_id);
            recorded.push(self.store.insert(equipment)?);
        }

        self.audit(
            actor,
            "sync",
            "equipment",
            format!("employee_id={}: fetched={}, recorded={}", employee_id, items.len(), recorded.len()),
        )?;
        Ok(recorded)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use shared::models::AuditEntry;

    use super::super::test_support::*;
    use super::*;
    use crate::gateways::TicketingUser;
    use crate::gateways::fake::FakeGateways;

    fn user(id: &str, email: Option<&str>, name: &str) -> TicketingUser {
        TicketingUser {
            id: Some(id.into()),
            email: email.map(str::to_string),
            full_name: Some(name.into()),
            phone: Some("555".into()),
        }
    }

    #[tokio::test]
    async fn test_health_counts_users() {
        let (s, _) = sync_with(FakeGateways {
            ticketing_users: vec![user("1", None, "A"), user("2", None, "B")],
            ..Default::default()
        });
        assert_eq!(s.ticketing_health().await.users_count, 2);

        let (s, _) = sync_with(FakeGateways { fail: true, ..Default::default() });
        let health = s.ticketing_health().await;
        assert_eq!(health.status, "unavailable");
        assert_eq!(health.users_count, 0);
    }

    #[tokio::test]
    async fn test_pull_users_by_email() {
        let (s, _) = sync_with(FakeGateways {
            ticketing_users: vec![
                user("1", Some("a@corp.org"), "Анна"),
                user("2", Some("B@corp.org"), "Борис"),
                user("3", None, "Без почты"),
            ],
            ..Default::default()
        });
        let mut existing = Employee::new("Борис старый");
        existing.email = Some("b@corp.org".into());
        store(&s).insert(existing).unwrap();

        let report = s.pull_ticketing_users("admin").await.unwrap();
        assert_eq!(report, PullReport { created: 1, updated: 1, skipped: 1 });

        let b = store(&s).find_employee_by_email("b@corp.org").unwrap().unwrap();
        assert_eq!(b.full_name, "Борис");
        assert_eq!(b.internal_phone.as_deref(), Some("555"));
        let a = store(&s).find_employee_by_email("a@corp.org").unwrap().unwrap();
        assert_eq!(a.status, EmployeeStatus::Active);

        let audit = store(&s).recent_audit(10).unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].user, "admin");
    }

    #[tokio::test]
    async fn test_push_contacts() {
        let (s, fake) = sync_with(FakeGateways {
            ticketing_users: vec![user("7", Some("known@corp.org"), "Known")],
            ..Default::default()
        });
        let dept = store(&s).insert(Department::new("ИТ")).unwrap();
        let mut known = Employee::new("Известный");
        known.email = Some("known@corp.org".into());
        known.status = EmployeeStatus::Active;
        known.department_id = Some(dept.id);
        store(&s).insert(known).unwrap();
        let mut unknown = Employee::new("Новый");
        unknown.email = Some("new@corp.org".into());
        unknown.status = EmployeeStatus::Active;
        store(&s).insert(unknown).unwrap();
        let mut no_mail = Employee::new("Без почты");
        no_mail.status = EmployeeStatus::Active;
        store(&s).insert(no_mail).unwrap();
        // not active: ignored entirely
        let mut gone = Employee::new("Уволен");
        gone.email = Some("gone@corp.org".into());
        gone.status = EmployeeStatus::Dismissed;
        store(&s).insert(gone).unwrap();

        let report = s.push_ticketing_contacts("it", false).await.unwrap();
        assert_eq!(report, PushReport { updated: 1, created: 0, skipped: 2 });
        {
            let recorded = fake.recorded.lock().unwrap();
            assert_eq!(recorded.updated_users.len(), 1);
            let (id, fields) = &recorded.updated_users[0];
            assert_eq!(id, "7");
            assert_eq!(fields.department.as_deref(), Some("ИТ"));
            assert_eq!(fields.email, None);
        }

        let report = s.push_ticketing_contacts("it", true).await.unwrap();
        assert_eq!(report, PushReport { updated: 1, created: 1, skipped: 1 });
        let recorded = fake.recorded.lock().unwrap();
        assert_eq!(recorded.created_users[0].email.as_deref(), Some("new@corp.org"));
        drop(recorded);

        assert_eq!(store(&s).list::<AuditEntry>().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_pull_equipment() {
        let (s, _) = sync_with(FakeGateways {
            equipment: vec![
                json!({"type": "laptop", "serial_number": "SN-1"}),
                json!({"name": "Монитор", "inventory_number": "INV-2", "status": "repair"}),
            ],
            ..Default::default()
        });
        let e = store(&s).insert(Employee::new("A")).unwrap();

        let recorded = s.pull_equipment("it", e.id).await.unwrap();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[1].kind, "Монитор");
        assert_eq!(recorded[1].status, "repair");
        assert_eq!(recorded[0].employee_id, Some(e.id));

        // second pull does not duplicate
        assert!(s.pull_equipment("it", e.id).await.unwrap().is_empty());
        assert_eq!(store(&s).equipment_for_employee(e.id).unwrap().len(), 2);

        assert!(s.pull_equipment("it", 999).await.is_err());
    }

    #[tokio::test]
    async fn test_pull_equipment_without_serial_is_recorded_once() {
        let (s, _) = sync_with(FakeGateways {
            equipment: vec![json!({"type": "headset"})],
            ..Default::default()
        });
        let e = store(&s).insert(Employee::new("A")).unwrap();

        for _ in 0..3 {
            s.pull_equipment("it", e.id).await.unwrap();
        }
        let rows = store(&s).equipment_for_employee(e.id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].serial_number, None);

        // a different type without serial is still new
        let (s2, _) = sync_with(FakeGateways {
            equipment: vec![json!({"type": "Headset"}), json!({"type": "mouse"})],
            ..Default::default()
        });
        let e2 = store(&s2).insert(Employee::new("B")).unwrap();
        assert_eq!(s2.pull_equipment("it", e2.id).await.unwrap().len(), 2);
        assert_eq!(s2.pull_equipment("it", e2.id).await.unwrap().len(), 0);
    }
}
