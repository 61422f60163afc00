//! Employee Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Employment status. Transitions drive provisioning side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    Candidate,
    Active,
    Dismissed,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Candidate => "candidate",
            EmployeeStatus::Active => "active",
            EmployeeStatus::Dismissed => "dismissed",
        }
    }
}

impl std::fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Employee entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: u64,
    pub full_name: String,
    #[serde(default)]
    pub position_id: Option<u64>,
    #[serde(default)]
    pub department_id: Option<u64>,
    #[serde(default)]
    pub manager_id: Option<u64>,
    #[serde(default)]
    pub internal_phone: Option<String>,
    #[serde(default)]
    pub external_phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub status: EmployeeStatus,
    #[serde(default)]
    pub uses_it_equipment: bool,
    #[serde(default)]
    pub external_id: Option<String>,
    /// Physical access badge number
    #[serde(default)]
    pub pass_number: Option<String>,
}

impl Employee {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            id: 0,
            full_name: full_name.into(),
            position_id: None,
            department_id: None,
            manager_id: None,
            internal_phone: None,
            external_phone: None,
            email: None,
            birthday: None,
            status: EmployeeStatus::Candidate,
            uses_it_equipment: false,
            external_id: None,
            pass_number: None,
        }
    }

    /// Email if set and non-blank
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.trim().is_empty())
    }

    /// Preferred contact phone: internal first, then external
    pub fn phone(&self) -> Option<&str> {
        self.internal_phone
            .as_deref()
            .or(self.external_phone.as_deref())
    }
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub full_name: String,
    pub position_id: Option<u64>,
    pub department_id: Option<u64>,
    pub manager_id: Option<u64>,
    pub internal_phone: Option<String>,
    pub external_phone: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub status: EmployeeStatus,
    #[serde(default)]
    pub uses_it_equipment: bool,
    pub external_id: Option<String>,
    pub pass_number: Option<String>,
}

/// Update employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub full_name: Option<String>,
    pub position_id: Option<u64>,
    pub department_id: Option<u64>,
    pub manager_id: Option<u64>,
    pub internal_phone: Option<String>,
    pub external_phone: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
    pub uses_it_equipment: Option<bool>,
    pub external_id: Option<String>,
    pub pass_number: Option<String>,
}

impl From<EmployeeCreate> for Employee {
    fn from(data: EmployeeCreate) -> Self {
        Self {
            id: 0,
            full_name: data.full_name,
            position_id: data.position_id,
            department_id: data.department_id,
            manager_id: data.manager_id,
            internal_phone: data.internal_phone,
            external_phone: data.external_phone,
            email: data.email,
            birthday: data.birthday,
            status: data.status,
            uses_it_equipment: data.uses_it_equipment,
            external_id: data.external_id,
            pass_number: data.pass_number,
        }
    }
}

impl Employee {
    pub fn apply(&mut self, update: EmployeeUpdate) {
        if let Some(full_name) = update.full_name {
            self.full_name = full_name;
        }
        if update.position_id.is_some() {
            self.position_id = update.position_id;
        }
        if update.department_id.is_some() {
            self.department_id = update.department_id;
        }
        if update.manager_id.is_some() {
            self.manager_id = update.manager_id;
        }
        if update.internal_phone.is_some() {
            self.internal_phone = update.internal_phone;
        }
        if update.external_phone.is_some() {
            self.external_phone = update.external_phone;
        }
        if update.email.is_some() {
            self.email = update.email;
        }
        if update.birthday.is_some() {
            self.birthday = update.birthday;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(uses) = update.uses_it_equipment {
            self.uses_it_equipment = uses;
        }
        if update.external_id.is_some() {
            self.external_id = update.external_id;
        }
        if update.pass_number.is_some() {
            self.pass_number = update.pass_number;
        }
    }
}
