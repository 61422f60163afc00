use shared::models::{AccountStatus, Employee, EmployeeStatus, equipment::STATUS_IN_USE};

use super::{Changes, Lifecycle, LifecycleResult};
use crate::gateways::Degrade;

impl Lifecycle {
    /// Block every account, warn about unreturned equipment; the employee
    /// becomes dismissed
    pub(super) async fn fire(&self, mut employee: Employee) -> LifecycleResult<Changes> {
        let mut accounts = self.store.accounts_for_employee(employee.id)?;
        let directory_accounts: Vec<String> = accounts
            .iter()
            .filter_map(|a| a.directory_account.clone())
            .filter(|a| !a.is_empty())
            .collect();

        let directory = &self.gateways.directory;
        if !directory_accounts.is_empty() {
            directory
                .block_users(&directory_accounts)
                .await
                .logged("directory_block_users");
        }
        for account in &directory_accounts {
            directory.disable_user(account).await.logged("directory_disable_user");
        }
        if let Some(email) = employee.email() {
            self.gateways
                .mail
                .disable_mailbox(email)
                .await
                .logged("disable_mailbox");
        }
        for account in &mut accounts {
            account.status = AccountStatus::Blocked;
        }

        let remote = self.ticketing_equipment(&employee).await;
        let local = self
            .store
            .equipment_for_employee(employee.id)?
            .into_iter()
            .filter(|e| e.status == STATUS_IN_USE)
            .count();
        if !remote.is_empty() || local > 0 {
            tracing::warn!(
                employee_id = employee.id,
                remote = remote.len(),
                local,
                "Dismissed employee still holds equipment"
            );
            let notifier = &self.gateways.notifier;
            notifier
                .internal(&format!("Оборудование не сдано: {}", employee.full_name))
                .await
                .logged("internal_notification");
            notifier
                .send_email(
                    &self.settings.it_mailbox,
                    "Не сдано оборудование",
                    &format!("У сотрудника {} осталось оборудование.", employee.full_name),
                )
                .await
                .logged("equipment_email");
        }

        tracing::info!(
            employee_id = employee.id,
            accounts = accounts.len(),
            "IT accounts blocked"
        );
        employee.status = EmployeeStatus::Dismissed;
        let mut changes = Changes::for_employee(employee);
        changes.updated_accounts = accounts;
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use shared::models::{Equipment, HrRequest, ItAccount, RequestKind, RequestStatus};

    use super::super::test_support::*;
    use super::*;
    use crate::gateways::fake::FakeGateways;

    fn account(employee_id: u64, directory: Option<&str>) -> ItAccount {
        let mut a = ItAccount::new(employee_id);
        a.directory_account = directory.map(str::to_string);
        a
    }

    #[tokio::test]
    async fn test_fire_without_accounts() {
        let (lc, fake) = lifecycle();
        let employee = lc.store().insert(Employee::new("Петров Пётр")).unwrap();
        let req = request(&lc, RequestKind::Fire, employee.id, false);

        let done = lc.process(req.id, day(2024, 2, 1)).await.unwrap();
        assert_eq!(done.status, RequestStatus::Done);

        let e: Employee = lc.store().require(employee.id).unwrap();
        assert_eq!(e.status, EmployeeStatus::Dismissed);
        let recorded = fake.recorded.lock().unwrap();
        assert!(recorded.blocked.is_empty());
        assert!(recorded.disabled_mailboxes.is_empty());
        assert!(recorded.internal.is_empty());
    }

    #[tokio::test]
    async fn test_fire_blocks_accounts_and_mailbox() {
        let (lc, fake) = lifecycle();
        let mut employee = Employee::new("Петров Пётр");
        employee.email = Some("p.petrov@corp.org".into());
        let employee = lc.store().insert(employee).unwrap();
        lc.store().insert(account(employee.id, Some("p.petrov"))).unwrap();
        lc.store().insert(account(employee.id, None)).unwrap();
        let req = request(&lc, RequestKind::Fire, employee.id, false);

        lc.process(req.id, day(2024, 2, 1)).await.unwrap();

        let recorded = fake.recorded.lock().unwrap();
        assert_eq!(recorded.blocked, vec![vec!["p.petrov".to_string()]]);
        assert_eq!(recorded.disabled_accounts, vec!["p.petrov"]);
        assert_eq!(recorded.disabled_mailboxes, vec!["p.petrov@corp.org"]);
        drop(recorded);

        let accounts = lc.store().accounts_for_employee(employee.id).unwrap();
        assert_eq!(accounts.len(), 2);
        assert!(accounts.iter().all(|a| a.status == AccountStatus::Blocked));
    }

    #[tokio::test]
    async fn test_fire_blocks_accounts_even_when_gateways_fail() {
        let (lc, _) = lifecycle_with(FakeGateways {
            fail: true,
            ..Default::default()
        });
        let employee = lc.store().insert(Employee::new("A")).unwrap();
        lc.store().insert(account(employee.id, Some("a"))).unwrap();
        let req = request(&lc, RequestKind::Fire, employee.id, false);

        lc.process(req.id, day(2024, 2, 1)).await.unwrap();
        let accounts = lc.store().accounts_for_employee(employee.id).unwrap();
        assert_eq!(accounts[0].status, AccountStatus::Blocked);
        let r: HrRequest = lc.store().require(req.id).unwrap();
        assert!(r.is_done());
    }

    #[tokio::test]
    async fn test_outstanding_equipment_warning() {
        let (lc, fake) = lifecycle_with(FakeGateways {
            equipment: vec![json!({"name": "Ноутбук"})],
            ..Default::default()
        });
        let employee = lc.store().insert(Employee::new("Петров Пётр")).unwrap();
        let req = request(&lc, RequestKind::Fire, employee.id, false);
        lc.process(req.id, day(2024, 2, 1)).await.unwrap();

        let recorded = fake.recorded.lock().unwrap();
        assert_eq!(recorded.internal, vec!["Оборудование не сдано: Петров Пётр"]);
        assert_eq!(
            recorded.emails,
            vec![("it@corp.org".to_string(), "Не сдано оборудование".to_string())]
        );
    }

    #[tokio::test]
    async fn test_local_equipment_counts() {
        let (lc, fake) = lifecycle();
        let employee = lc.store().insert(Employee::new("A")).unwrap();
        let mut laptop = Equipment::new("laptop");
        laptop.employee_id = Some(employee.id);
        lc.store().insert(laptop).unwrap();
        let req = request(&lc, RequestKind::Fire, employee.id, false);
        lc.process(req.id, day(2024, 2, 1)).await.unwrap();

        assert_eq!(fake.recorded.lock().unwrap().internal.len(), 1);
    }
}
