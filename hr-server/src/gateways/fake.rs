//! Recording gateway doubles for unit tests

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::{
    DirectoryGateway, DirectoryUser, GatewayError, GatewayResult, Gateways, MailGateway, Notifier,
    OwnerRef, PayrollSource, TicketingGateway, TicketingUser, UserFields,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub title: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub tickets: Vec<Ticket>,
    pub emails: Vec<(String, String)>,
    pub internal: Vec<String>,
    pub created_accounts: Vec<String>,
    pub created_mailboxes: Vec<String>,
    pub blocked: Vec<Vec<String>>,
    pub disabled_accounts: Vec<String>,
    pub disabled_mailboxes: Vec<String>,
    pub updated_users: Vec<(String, UserFields)>,
    pub created_users: Vec<UserFields>,
}

/// One object implementing every gateway contract.
///
/// With `fail` set every call returns `Status(503)` after being recorded.
#[derive(Default)]
pub struct FakeGateways {
    pub fail: bool,
    pub ticketing_users: Vec<TicketingUser>,
    pub directory_users: Vec<DirectoryUser>,
    pub equipment: Vec<Value>,
    pub payroll: Option<[Vec<Value>; 3]>,
    pub recorded: Mutex<Recorded>,
}

impl FakeGateways {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn bundle(this: &Arc<Self>) -> Gateways {
        Gateways {
            ticketing: this.clone(),
            directory: this.clone(),
            mail: this.clone(),
            payroll: this.clone(),
            notifier: this.clone(),
        }
    }

    pub fn tickets(&self) -> Vec<Ticket> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner).tickets.clone()
    }

    fn record(&self, f: impl FnOnce(&mut Recorded)) -> GatewayResult<()> {
        f(&mut self.recorded.lock().unwrap_or_else(PoisonError::into_inner));
        self.outcome(())
    }

    fn outcome<T>(&self, value: T) -> GatewayResult<T> {
        if self.fail {
            Err(GatewayError::Status(503))
        } else {
            Ok(value)
        }
    }
}

#[async_trait]
impl TicketingGateway for FakeGateways {
    async fn create_ticket(
        &self,
        title: &str,
        description: &str,
        category: &str,
    ) -> GatewayResult<()> {
        self.record(|r| {
            r.tickets.push(Ticket {
                title: title.to_string(),
                description: description.to_string(),
                category: category.to_string(),
            })
        })
    }

    async fn fetch_users(&self) -> GatewayResult<Vec<TicketingUser>> {
        self.outcome(self.ticketing_users.clone())
    }

    async fn update_user(&self, user_id: &str, fields: &UserFields) -> GatewayResult<()> {
        self.record(|r| r.updated_users.push((user_id.to_string(), fields.clone())))
    }

    async fn create_user(&self, fields: &UserFields) -> GatewayResult<()> {
        self.record(|r| r.created_users.push(fields.clone()))
    }

    async fn fetch_equipment_for(&self, _owner: &OwnerRef) -> GatewayResult<Vec<Value>> {
        self.outcome(self.equipment.clone())
    }
}

#[async_trait]
impl DirectoryGateway for FakeGateways {
    async fn search_users(&self) -> GatewayResult<Vec<DirectoryUser>> {
        self.outcome(self.directory_users.clone())
    }

    async fn create_user(&self, email: &str, _full_name: &str) -> GatewayResult<String> {
        let account = format!("dir-{}", shared::naming::local_part(email));
        self.record(|r| r.created_accounts.push(account.clone()))?;
        Ok(account)
    }

    async fn disable_user(&self, account: &str) -> GatewayResult<()> {
        self.record(|r| r.disabled_accounts.push(account.to_string()))
    }

    async fn block_users(&self, accounts: &[String]) -> GatewayResult<()> {
        self.record(|r| r.blocked.push(accounts.to_vec()))
    }
}

#[async_trait]
impl MailGateway for FakeGateways {
    async fn create_mailbox(&self, email: &str, _full_name: &str) -> GatewayResult<()> {
        self.record(|r| r.created_mailboxes.push(email.to_string()))
    }

    async fn disable_mailbox(&self, email: &str) -> GatewayResult<()> {
        self.record(|r| r.disabled_mailboxes.push(email.to_string()))
    }
}

#[async_trait]
impl PayrollSource for FakeGateways {
    fn is_configured(&self) -> bool {
        self.payroll.is_some()
    }

    async fn fetch_departments(&self) -> GatewayResult<Vec<Value>> {
        self.catalog(0)
    }

    async fn fetch_positions(&self) -> GatewayResult<Vec<Value>> {
        self.catalog(1)
    }

    async fn fetch_employees(&self) -> GatewayResult<Vec<Value>> {
        self.catalog(2)
    }
}

impl FakeGateways {
    fn catalog(&self, index: usize) -> GatewayResult<Vec<Value>> {
        let items = self
            .payroll
            .as_ref()
            .ok_or(GatewayError::NotConfigured)?[index]
            .clone();
        self.outcome(items)
    }
}

#[async_trait]
impl Notifier for FakeGateways {
    async fn send_email(&self, to: &str, subject: &str, _body: &str) -> GatewayResult<()> {
        self.record(|r| r.emails.push((to.to_string(), subject.to_string())))
    }

    async fn internal(&self, message: &str) -> GatewayResult<()> {
        self.record(|r| r.internal.push(message.to_string()))
    }
}
