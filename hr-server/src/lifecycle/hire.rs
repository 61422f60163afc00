use shared::models::{Employee, EmployeeStatus, HrRequest, ItAccount};
use shared::naming::AccountHandles;

use super::{Changes, Lifecycle, TICKET_CATEGORY, display_date};
use crate::gateways::Degrade;

const WELCOME_SUBJECT: &str = "Инструкции ИБ и доступы";
const WELCOME_BODY: &str = "Аккаунты созданы, ознакомьтесь с инструкцией.";

fn badge_block(pass_number: &str) -> String {
    format!("Добавить пропуск в систему СКУД:\nДанные пропуска: {}", pass_number)
}

impl Lifecycle {
    /// Provision accounts when equipment is needed; the employee becomes active
    pub(super) async fn hire(&self, request: &HrRequest, mut employee: Employee) -> Changes {
        let pass_number = request
            .pass_number
            .clone()
            .or_else(|| employee.pass_number.clone())
            .filter(|p| !p.trim().is_empty());

        let mut new_accounts = Vec::new();
        if request.needs_it_equipment {
            new_accounts.push(self.provision(&mut employee).await);

            let email = employee.email.clone().unwrap_or_default();
            let mut description = format!(
                "ФИО: {}\nEmail: {}\nДата выхода: {}",
                employee.full_name,
                email,
                display_date(request.effective_date)
            );
            if let Some(pass) = &pass_number {
                description.push_str("\n\n");
                description.push_str(&badge_block(pass));
            }
            self.ticket(&format!("Онбординг: {}", employee.full_name), &description, TICKET_CATEGORY)
                .await;
        } else if let Some(pass) = &pass_number {
            let description = format!(
                "ФИО: {}\nДата выхода: {}\n\n{}",
                employee.full_name,
                display_date(request.effective_date),
                badge_block(pass)
            );
            self.ticket(
                &format!("Добавить пропуск в СКУД: {}", employee.full_name),
                &description,
                TICKET_CATEGORY,
            )
            .await;
        }

        employee.status = EmployeeStatus::Active;
        Changes {
            employee,
            new_accounts,
            updated_accounts: Vec::new(),
        }
    }

    /// Directory account, mailbox and messenger handle for a new hire
    async fn provision(&self, employee: &mut Employee) -> ItAccount {
        let handles = AccountHandles::for_name(&employee.full_name, &self.settings.email_domain);
        if employee.email().is_none() {
            employee.email = Some(handles.email.clone());
        }
        let email = employee.email.clone().unwrap_or_else(|| handles.email.clone());

        let directory_account = self
            .gateways
            .directory
            .create_user(&email, &employee.full_name)
            .await
            .logged("directory_create_user")
            .unwrap_or_else(|| handles.directory_account.clone());
        let mailbox_created = self
            .gateways
            .mail
            .create_mailbox(&email, &employee.full_name)
            .await
            .logged("create_mailbox")
            .is_some();

        let mut account = ItAccount::new(employee.id);
        account.directory_account = Some(directory_account);
        account.mailbox = Some(if mailbox_created { email.clone() } else { handles.email.clone() });
        account.messenger_handle = Some(handles.messenger_handle.clone());

        let notifier = &self.gateways.notifier;
        let to = employee.email().unwrap_or(self.settings.hr_mailbox.as_str());
        notifier
            .send_email(to, WELCOME_SUBJECT, WELCOME_BODY)
            .await
            .logged("welcome_email");
        notifier
            .internal(&format!("Созданы ИТ-учетки для {}", employee.full_name))
            .await
            .logged("internal_notification");

        tracing::info!(
            employee_id = employee.id,
            directory_account = ?account.directory_account,
            mailbox = ?account.mailbox,
            "IT accounts provisioned"
        );
        account
    }
}
