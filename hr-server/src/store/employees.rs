use redb::{TableDefinition, WriteTransaction};
use shared::models::{Employee, EmployeeStatus};

use super::{Record, Store, StoreResult};

impl Record for Employee {
    const ENTITY: &'static str = "employee";
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = TableDefinition::new("employees");

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }
}

fn email_matches(employee: &Employee, email: &str) -> bool {
    employee
        .email()
        .is_some_and(|e| e.eq_ignore_ascii_case(email.trim()))
}

impl Store {
    /// Employee by email, case-insensitive
    pub fn find_employee_by_email(&self, email: &str) -> StoreResult<Option<Employee>> {
        Ok(self
            .filter(|e: &Employee| email_matches(e, email))?
            .into_iter()
            .next())
    }

    pub fn find_employee_by_email_in(
        txn: &WriteTransaction,
        email: &str,
    ) -> StoreResult<Option<Employee>> {
        Ok(Store::filter_in(txn, |e: &Employee| email_matches(e, email))?
            .into_iter()
            .next())
    }

    pub fn employees_by_status(&self, status: EmployeeStatus) -> StoreResult<Vec<Employee>> {
        self.filter(|e: &Employee| e.status == status)
    }

    /// Employees whose name contains `query` (case-insensitive) and,
    /// when given, who belong to `department_id`
    pub fn search_employees(
        &self,
        query: Option<&str>,
        department_id: Option<u64>,
    ) -> StoreResult<Vec<Employee>> {
        let needle = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        self.filter(|e: &Employee| {
            let name_ok = needle
                .as_ref()
                .is_none_or(|q| e.full_name.to_lowercase().contains(q.as_str()));
            let dept_ok = department_id.is_none_or(|d| e.department_id == Some(d));
            name_ok && dept_ok
        })
    }
}
