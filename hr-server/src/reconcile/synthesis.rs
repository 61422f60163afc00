//! HR request synthesis for externally detected hires and dismissals

use chrono::NaiveDate;
use shared::models::{Department, Employee, HrRequest, Position, RequestKind, RequestStatus};
use shared::naming::corporate_email;

use super::Reconciler;
use crate::gateways::Degrade;
use crate::store::StoreResult;

/// Ticket category for requests that came from the payroll side
pub const PAYROLL_TICKET_CATEGORY: &str = "other";

const NOT_SPECIFIED: &str = "Не указано";

/// A synthesized request, or the open one that made synthesis unnecessary
#[derive(Debug, Clone)]
pub(crate) struct Synthesized {
    pub request: HrRequest,
    pub ticket_created: bool,
    /// `false` when an open request of the same kind was reused
    pub fresh: bool,
}

impl Reconciler {
    fn org_labels(&self, employee: &Employee) -> (String, String) {
        let department = employee
            .department_id
            .and_then(|id| self.store.get::<Department>(id).ok().flatten())
            .map(|d| d.name);
        let position = employee
            .position_id
            .and_then(|id| self.store.get::<Position>(id).ok().flatten())
            .map(|p| p.name);
        (
            department.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            position.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        )
    }

    /// Open (not done) request of this kind for the employee
    fn open_request(&self, employee_id: u64, kind: &RequestKind) -> StoreResult<Option<HrRequest>> {
        Ok(self
            .store
            .filter(|r: &HrRequest| {
                r.employee_id == employee_id && &r.kind == kind && !r.is_done()
            })?
            .into_iter()
            .next())
    }

    /// Create a pending hire request and open an onboarding ticket.
    ///
    /// An open hire request of the employee is returned as is.
    pub(crate) async fn open_hire_request(
        &self,
        employee: &Employee,
        effective_date: Option<NaiveDate>,
        needs_it_equipment: bool,
        pass_number: Option<String>,
        today: NaiveDate,
    ) -> StoreResult<Synthesized> {
        if let Some(request) = self.open_request(employee.id, &RequestKind::Hire)? {
            tracing::debug!(employee_id = employee.id, request_id = request.id, "Open hire request exists");
            return Ok(Synthesized {
                request,
                ticket_created: false,
                fresh: false,
            });
        }

        let mut request = HrRequest::new(RequestKind::Hire, employee.id);
        request.status = RequestStatus::Pending;
        request.request_date = Some(today);
        request.effective_date = Some(effective_date.unwrap_or(today));
        request.needs_it_equipment = needs_it_equipment;
        request.pass_number = pass_number;
        let request = self.store.insert(request)?;

        let email = employee
            .email()
            .map(str::to_string)
            .unwrap_or_else(|| corporate_email(&employee.full_name, &self.email_domain));
        let (department, position) = self.org_labels(employee);
        let description = format!(
            "HR: Приём на работу (из 1С ЗУП)\n\n\
             ФИО: {}\nEmail: {}\nОтдел: {}\nДолжность: {}\nДата выхода: {}\n",
            employee.full_name,
            email,
            department,
            position,
            effective_date.map_or_else(|| NOT_SPECIFIED.to_string(), |d| d.to_string()),
        );
        let ticket = self
            .gateways
            .ticketing
            .create_ticket(
                &format!("Онбординг: {}", employee.full_name),
                &description,
                PAYROLL_TICKET_CATEGORY,
            )
            .await
            .logged("create_ticket")
            .is_some();

        tracing::info!(
            employee_id = employee.id,
            request_id = request.id,
            ticket_created = ticket,
            "Hire request synthesized"
        );
        Ok(Synthesized {
            request,
            ticket_created: ticket,
            fresh: true,
        })
    }

    /// Create a pending fire request and open an offboarding ticket.
    ///
    /// An open fire request of the employee is returned as is.
    pub(crate) async fn open_fire_request(
        &self,
        employee: &Employee,
        effective_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> StoreResult<Synthesized> {
        if let Some(request) = self.open_request(employee.id, &RequestKind::Fire)? {
            tracing::debug!(employee_id = employee.id, request_id = request.id, "Open fire request exists");
            return Ok(Synthesized {
                request,
                ticket_created: false,
                fresh: false,
            });
        }

        let mut request = HrRequest::new(RequestKind::Fire, employee.id);
        request.status = RequestStatus::Pending;
        request.request_date = Some(today);
        request.effective_date = Some(effective_date.unwrap_or(today));
        let request = self.store.insert(request)?;

        let (department, position) = self.org_labels(employee);
        let description = format!(
            "HR: Увольнение сотрудника (из 1С ЗУП)\n\n\
             ФИО: {}\nEmail: {}\nОтдел: {}\nДолжность: {}\nДата увольнения: {}\n\n\
             Необходимо:\n- Заблокировать учётные записи\n- Принять оборудование\n",
            employee.full_name,
            employee.email().unwrap_or(NOT_SPECIFIED),
            department,
            position,
            effective_date.map_or_else(|| NOT_SPECIFIED.to_string(), |d| d.to_string()),
        );
        let ticket = self
            .gateways
            .ticketing
            .create_ticket(
                &format!("Увольнение: {}", employee.full_name),
                &description,
                PAYROLL_TICKET_CATEGORY,
            )
            .await
            .logged("create_ticket")
            .is_some();

        tracing::info!(
            employee_id = employee.id,
            request_id = request.id,
            ticket_created = ticket,
            "Fire request synthesized"
        );
        Ok(Synthesized {
            request,
            ticket_created: ticket,
            fresh: true,
        })
    }
}
