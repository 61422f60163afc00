use chrono::NaiveDate;
use serde_json::{Map, Value};
use shared::models::{Employee, EmployeeStatus};

use super::fields::{
    self, BIRTHDAY, DEPARTMENT_LABEL, DEPARTMENT_REF, DISMISSED, EFFECTIVE_DATE, EMAIL,
    EXTERNAL_ID, FULL_NAME, MANAGER_REF, NEW_HIRE, PHONE, POSITION_LABEL, POSITION_REF,
};
use super::{BatchMaps, ImportReport, Kind, Reconciler, objects, reject};
use crate::store::{StoreError, StoreResult};

/// Employee record after alias resolution
#[derive(Debug)]
struct EmployeeRow {
    external_id: String,
    full_name: String,
    birthday: Option<NaiveDate>,
    phone: Option<String>,
    email: Option<String>,
    department_id: Option<u64>,
    position_id: Option<u64>,
    dismissed: bool,
    new_hire: bool,
    effective_date: Option<NaiveDate>,
}

/// Why a record was rejected
enum RowError {
    Invalid(String),
    Store(StoreError),
}

impl From<StoreError> for RowError {
    fn from(e: StoreError) -> Self {
        RowError::Store(e)
    }
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowError::Invalid(msg) => f.write_str(msg),
            RowError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl Reconciler {
    pub(super) async fn import_employees(
        &self,
        records: &[Value],
        maps: &mut BatchMaps,
        report: &mut ImportReport,
        create_hr_requests: bool,
        today: NaiveDate,
    ) {
        let mut managers = Vec::new();

        for (i, record) in objects(records, Kind::Employee, report) {
            let who = fields::text(record, FULL_NAME)
                .or_else(|| fields::text(record, EXTERNAL_ID))
                .unwrap_or_else(|| format!("#{}", i));

            let row = match self.employee_row(record, maps) {
                Ok(row) => row,
                Err(e) => {
                    reject(report, Kind::Employee, &who, e);
                    continue;
                }
            };

            let (employee, previous) = match self.upsert_employee(&row) {
                Ok(pair) => pair,
                Err(e) => {
                    reject(report, Kind::Employee, &who, e);
                    continue;
                }
            };
            if previous.is_some() {
                report.employees.updated += 1;
            } else {
                report.employees.created += 1;
            }
            maps.employees.insert(row.external_id.clone(), employee.id);
            if let Some(manager) = fields::reference(record, MANAGER_REF) {
                managers.push((employee.id, row.external_id.clone(), manager));
            }

            if create_hr_requests {
                self.synthesize_requests(&row, &employee, previous, today, report)
                    .await;
            }
        }

        // Pass 2: managers, any ordering within the batch
        for (id, ext, manager_ext) in managers {
            let resolved = match maps.employees.get(&manager_ext) {
                Some(mid) => Ok(Some(*mid)),
                None => self.store.id_for_external_id::<Employee>(&manager_ext),
            };
            match resolved {
                Ok(Some(manager_id)) if manager_id != id => {
                    if let Err(e) = self.set_manager(id, manager_id) {
                        reject(report, Kind::Employee, &ext, e);
                    }
                }
                Ok(_) => {}
                Err(e) => reject(report, Kind::Employee, &ext, e),
            }
        }
    }

    fn employee_row(
        &self,
        record: &Map<String, Value>,
        maps: &BatchMaps,
    ) -> Result<EmployeeRow, RowError> {
        let (Some(external_id), Some(full_name)) = (
            fields::text(record, EXTERNAL_ID),
            fields::text(record, FULL_NAME),
        ) else {
            return Err(RowError::Invalid("missing external id or full name".into()));
        };

        let birthday = fields::date(record, BIRTHDAY).map_err(RowError::Invalid)?;
        let effective_date = fields::date(record, EFFECTIVE_DATE).map_err(RowError::Invalid)?;

        // Department: batch map → store index → name
        let mut department_id = match fields::reference(record, DEPARTMENT_REF) {
            Some(ext) => self.resolve_department(maps, &ext)?,
            None => None,
        };
        if department_id.is_none()
            && let Some(name) = fields::label(record, DEPARTMENT_LABEL)
        {
            department_id = self.store.find_department_by_name(&name)?.map(|d| d.id);
        }

        let mut position_id = match fields::reference(record, POSITION_REF) {
            Some(ext) => self.resolve_position(maps, &ext)?,
            None => None,
        };
        if position_id.is_none()
            && let Some(name) = fields::label(record, POSITION_LABEL)
        {
            position_id = self.store.find_position_by_name(&name)?.map(|p| p.id);
        }

        Ok(EmployeeRow {
            external_id,
            full_name,
            birthday,
            phone: fields::text(record, PHONE),
            email: fields::text(record, EMAIL),
            department_id,
            position_id,
            dismissed: fields::flag(record, DISMISSED),
            new_hire: fields::flag(record, NEW_HIRE),
            effective_date,
        })
    }

    /// Returns the stored employee and its state before this import
    fn upsert_employee(&self, row: &EmployeeRow) -> StoreResult<(Employee, Option<Employee>)> {
        let existing = self.store.find_by_external_id::<Employee>(&row.external_id)?;

        let status = if row.dismissed {
            EmployeeStatus::Dismissed
        } else if row.new_hire && existing.is_none() {
            EmployeeStatus::Candidate
        } else {
            EmployeeStatus::Active
        };

        match existing {
            Some(previous) => {
                let mut employee = previous.clone();
                employee.full_name = row.full_name.clone();
                employee.birthday = row.birthday.or(employee.birthday);
                employee.internal_phone = row.phone.clone().or(employee.internal_phone);
                employee.email = row.email.clone().or(employee.email);
                employee.department_id = row.department_id.or(employee.department_id);
                employee.position_id = row.position_id.or(employee.position_id);
                employee.status = status;
                self.store.update(&employee)?;
                Ok((employee, Some(previous)))
            }
            None => {
                let mut employee = Employee::new(row.full_name.clone());
                employee.external_id = Some(row.external_id.clone());
                employee.birthday = row.birthday;
                employee.internal_phone = row.phone.clone();
                employee.email = row.email.clone();
                employee.department_id = row.department_id;
                employee.position_id = row.position_id;
                employee.status = status;
                Ok((self.store.insert(employee)?, None))
            }
        }
    }

    fn set_manager(&self, id: u64, manager_id: u64) -> StoreResult<()> {
        let mut employee: Employee = self.store.require(id)?;
        if employee.manager_id != Some(manager_id) {
            employee.manager_id = Some(manager_id);
            self.store.update(&employee)?;
        }
        Ok(())
    }

    async fn synthesize_requests(
        &self,
        row: &EmployeeRow,
        employee: &Employee,
        previous: Option<Employee>,
        today: NaiveDate,
        report: &mut ImportReport,
    ) {
        let was_active = previous
            .as_ref()
            .is_some_and(|p| p.status == EmployeeStatus::Active);
        let was_dismissed = previous
            .as_ref()
            .is_some_and(|p| p.status == EmployeeStatus::Dismissed);

        if row.new_hire || (!was_active && employee.status == EmployeeStatus::Active) {
            match self
                .open_hire_request(employee, row.effective_date, true, None, today)
                .await
            {
                Ok(s) if s.fresh => report.hire_requests_created += 1,
                Ok(_) => {}
                Err(e) => reject(report, Kind::Employee, &employee.full_name, e),
            }
        }

        if row.dismissed && !was_dismissed {
            match self
                .open_fire_request(employee, row.effective_date, today)
                .await
            {
                Ok(s) if s.fresh => report.fire_requests_created += 1,
                Ok(_) => {}
                Err(e) => reject(report, Kind::Employee, &employee.full_name, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use shared::models::{Department, HrRequest, Position, RequestKind, RequestStatus};

    use super::super::test_support::*;
    use super::super::{ImportBatch, KindCounts};
    use super::*;

    fn batch(employees: Vec<Value>) -> ImportBatch {
        ImportBatch {
            departments: vec![json!({"id": "d1", "name": "Бухгалтерия"})],
            positions: vec![json!({"id": "p1", "name": "Бухгалтер"})],
            employees,
        }
    }

    #[tokio::test]
    async fn test_employee_references_resolved() {
        let (r, _) = reconciler();
        let report = r
            .import_batch(
                &batch(vec![
                    json!({"id": "e1", "full_name": "Иванов Иван", "department_id": "d1", "position_id": "p1"}),
                    json!({"Ref_Key": "e2", "ФИО": "Петров Пётр", "Подразделение": "Бухгалтерия", "Должность": "Бухгалтер", "manager_id": "e1"}),
                ]),
                false,
            )
            .await;
        assert!(report.is_clean(), "{:?}", report.errors);

        let s = store(&r);
        let d: Department = s.find_by_external_id("d1").unwrap().unwrap();
        let p: Position = s.find_by_external_id("p1").unwrap().unwrap();
        let e1: Employee = s.find_by_external_id("e1").unwrap().unwrap();
        let e2: Employee = s.find_by_external_id("e2").unwrap().unwrap();
        assert_eq!(e1.department_id, Some(d.id));
        assert_eq!(e2.department_id, Some(d.id));
        assert_eq!(e2.position_id, Some(p.id));
        assert_eq!(e2.manager_id, Some(e1.id));
        assert_eq!(e1.status, EmployeeStatus::Active);
    }

    #[tokio::test]
    async fn test_manager_listed_after_subordinate() {
        let (r, _) = reconciler();
        r.import_batch(
            &batch(vec![
                json!({"id": "e2", "full_name": "B", "Руководитель_Key": "e1"}),
                json!({"id": "e1", "full_name": "A"}),
            ]),
            false,
        )
        .await;
        let s = store(&r);
        let e1: Employee = s.find_by_external_id("e1").unwrap().unwrap();
        let e2: Employee = s.find_by_external_id("e2").unwrap().unwrap();
        assert_eq!(e2.manager_id, Some(e1.id));
    }

    #[tokio::test]
    async fn test_one_malformed_record_rejected_rest_imported() {
        let (r, _) = reconciler();
        let report = r
            .import_batch(
                &batch(vec![
                    json!({"id": "e1", "full_name": "A"}),
                    json!({"id": "e2", "full_name": "B", "birthday": "31/12/1990"}),
                    json!({"id": "e3", "full_name": "C", "birthday": "1990-12-31T00:00:00"}),
                ]),
                false,
            )
            .await;
        assert_eq!(
            report.employees,
            KindCounts { created: 2, updated: 0, errors: 1 }
        );
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("B"));
        assert!(store(&r).find_by_external_id::<Employee>("e2").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_absent_values() {
        let (r, _) = reconciler();
        r.import_batch(
            &batch(vec![json!({
                "id": "e1", "full_name": "A", "email": "a@corp.org", "phone": "101",
                "birthday": "01.02.1990", "department_id": "d1"
            })]),
            false,
        )
        .await;

        let report = r
            .import_batch(
                &ImportBatch {
                    employees: vec![json!({"id": "e1", "full_name": "A renamed"})],
                    ..Default::default()
                },
                false,
            )
            .await;
        assert_eq!(report.employees.updated, 1);

        let e: Employee = store(&r).find_by_external_id("e1").unwrap().unwrap();
        assert_eq!(e.full_name, "A renamed");
        assert_eq!(e.email.as_deref(), Some("a@corp.org"));
        assert_eq!(e.internal_phone.as_deref(), Some("101"));
        assert_eq!(e.birthday, Some(day(1990, 2, 1)));
        assert!(e.department_id.is_some());
    }

    #[tokio::test]
    async fn test_status_derivation() {
        let (r, _) = reconciler();
        r.import_batch(
            &batch(vec![
                json!({"id": "new", "full_name": "N", "new_hire": true}),
                json!({"id": "gone", "full_name": "G", "Уволен": true}),
                json!({"id": "plain", "full_name": "P"}),
            ]),
            false,
        )
        .await;
        let s = store(&r);
        let status = |ext: &str| s.find_by_external_id::<Employee>(ext).unwrap().unwrap().status;
        assert_eq!(status("new"), EmployeeStatus::Candidate);
        assert_eq!(status("gone"), EmployeeStatus::Dismissed);
        assert_eq!(status("plain"), EmployeeStatus::Active);

        // The flag only matters for unseen employees
        r.import_batch(
            &ImportBatch {
                employees: vec![json!({"id": "new", "full_name": "N", "new_hire": true})],
                ..Default::default()
            },
            false,
        )
        .await;
        assert_eq!(status("new"), EmployeeStatus::Active);
    }

    #[tokio::test]
    async fn test_request_synthesis() {
        let (r, fake) = reconciler();
        let today = day(2024, 5, 1);

        let report = r
            .import_batch_on(
                &batch(vec![
                    json!({"id": "e1", "full_name": "Сидоров Олег", "new_hire": true, "hire_date": "20240510"}),
                    json!({"id": "e2", "full_name": "Old Timer"}),
                ]),
                true,
                today,
            )
            .await;
        // e2 is unseen and active, which also counts as a hire
        assert_eq!(report.hire_requests_created, 2);
        assert_eq!(report.fire_requests_created, 0);

        let s = store(&r);
        let e1: Employee = s.find_by_external_id("e1").unwrap().unwrap();
        let requests = s.filter(|q: &HrRequest| q.employee_id == e1.id).unwrap();
        assert_eq!(requests.len(), 1);
        let hire = &requests[0];
        assert_eq!(hire.kind, RequestKind::Hire);
        assert_eq!(hire.status, RequestStatus::Pending);
        assert!(hire.needs_it_equipment);
        assert_eq!(hire.request_date, Some(today));
        assert_eq!(hire.effective_date, Some(day(2024, 5, 10)));

        let tickets = fake.tickets();
        assert_eq!(tickets.len(), 2);
        assert!(tickets[0].title.contains("Сидоров Олег"));
        assert!(tickets[0].description.contains("o.sidorov@corp.org"));

        // Dismissal on a later import
        let report = r
            .import_batch_on(
                &ImportBatch {
                    employees: vec![json!({"id": "e2", "full_name": "Old Timer", "dismissed": true})],
                    ..Default::default()
                },
                true,
                today,
            )
            .await;
        assert_eq!(report.fire_requests_created, 1);
        assert_eq!(report.hire_requests_created, 0);
        assert_eq!(fake.tickets().len(), 3);

        // Re-import does not duplicate the open fire request
        let report = r
            .import_batch_on(
                &ImportBatch {
                    employees: vec![json!({"id": "e2", "full_name": "Old Timer", "dismissed": true})],
                    ..Default::default()
                },
                true,
                today,
            )
            .await;
        assert_eq!(report.fire_requests_created, 0);
    }

    #[tokio::test]
    async fn test_no_synthesis_without_flag() {
        let (r, fake) = reconciler();
        let report = r
            .import_batch(&batch(vec![json!({"id": "e1", "full_name": "A", "new_hire": true})]), false)
            .await;
        assert_eq!(report.hire_requests_created, 0);
        assert!(fake.tickets().is_empty());
        assert!(store(&r).list::<HrRequest>().unwrap().is_empty());
    }
}
