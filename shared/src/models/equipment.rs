//! Equipment Model

use serde::{Deserialize, Serialize};

pub const STATUS_IN_USE: &str = "in_use";

fn default_status() -> String {
    STATUS_IN_USE.to_string()
}

/// Equipment item, optionally assigned to an employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub employee_id: Option<u64>,
}

impl Equipment {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            id: 0,
            kind: kind.into(),
            serial_number: None,
            status: default_status(),
            employee_id: None,
        }
    }
}

/// Create equipment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentCreate {
    #[serde(rename = "type")]
    pub kind: String,
    pub serial_number: Option<String>,
    pub status: Option<String>,
    pub employee_id: Option<u64>,
}

/// Update equipment payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentUpdate {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub serial_number: Option<String>,
    pub status: Option<String>,
    pub employee_id: Option<u64>,
}

impl From<EquipmentCreate> for Equipment {
    fn from(data: EquipmentCreate) -> Self {
        Self {
            id: 0,
            kind: data.kind,
            serial_number: data.serial_number,
            status: data.status.unwrap_or_else(default_status),
            employee_id: data.employee_id,
        }
    }
}

impl Equipment {
    pub fn apply(&mut self, update: EquipmentUpdate) {
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if update.serial_number.is_some() {
            self.serial_number = update.serial_number;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if update.employee_id.is_some() {
            self.employee_id = update.employee_id;
        }
    }
}
