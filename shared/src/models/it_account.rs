//! IT Account Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    Blocked,
}

/// Provisioned account set of one employee (directory, mail, messenger)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItAccount {
    pub id: u64,
    pub employee_id: u64,
    #[serde(default)]
    pub directory_account: Option<String>,
    #[serde(default)]
    pub mailbox: Option<String>,
    #[serde(default)]
    pub messenger_handle: Option<String>,
    #[serde(default)]
    pub status: AccountStatus,
}

impl ItAccount {
    pub fn new(employee_id: u64) -> Self {
        Self {
            id: 0,
            employee_id,
            directory_account: None,
            mailbox: None,
            messenger_handle: None,
            status: AccountStatus::Active,
        }
    }
}
