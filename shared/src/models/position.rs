//! Position Model

use serde::{Deserialize, Serialize};

/// Job position, optionally bound to a department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub department_id: Option<u64>,
    /// Free-form description of the default access set for this position
    #[serde(default)]
    pub access_template: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
}

impl Position {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            department_id: None,
            access_template: None,
            external_id: None,
        }
    }
}

/// Create position payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionCreate {
    pub name: String,
    pub department_id: Option<u64>,
    pub access_template: Option<String>,
    pub external_id: Option<String>,
}

/// Update position payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub name: Option<String>,
    pub department_id: Option<u64>,
    pub access_template: Option<String>,
    pub external_id: Option<String>,
}

impl Position {
    pub fn apply(&mut self, update: PositionUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if update.department_id.is_some() {
            self.department_id = update.department_id;
        }
        if update.access_template.is_some() {
            self.access_template = update.access_template;
        }
        if update.external_id.is_some() {
            self.external_id = update.external_id;
        }
    }
}

impl From<PositionCreate> for Position {
    fn from(data: PositionCreate) -> Self {
        Self {
            id: 0,
            name: data.name,
            department_id: data.department_id,
            access_template: data.access_template,
            external_id: data.external_id,
        }
    }
}
