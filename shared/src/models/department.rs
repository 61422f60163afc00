//! Department Model

use serde::{Deserialize, Serialize};

/// Department entity. `parent_department_id` forms a tree that is assumed acyclic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub parent_department_id: Option<u64>,
    #[serde(default)]
    pub manager_id: Option<u64>,
    /// Identifier in the payroll system, unique when present
    #[serde(default)]
    pub external_id: Option<String>,
}

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            parent_department_id: None,
            manager_id: None,
            external_id: None,
        }
    }
}

/// Create department payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentCreate {
    pub name: String,
    pub parent_department_id: Option<u64>,
    pub manager_id: Option<u64>,
    pub external_id: Option<String>,
}

/// Update department payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentUpdate {
    pub name: Option<String>,
    pub parent_department_id: Option<u64>,
    pub manager_id: Option<u64>,
    pub external_id: Option<String>,
}

impl Department {
    pub fn apply(&mut self, update: DepartmentUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if update.parent_department_id.is_some() {
            self.parent_department_id = update.parent_department_id;
        }
        if update.manager_id.is_some() {
            self.manager_id = update.manager_id;
        }
        if update.external_id.is_some() {
            self.external_id = update.external_id;
        }
    }
}

impl From<DepartmentCreate> for Department {
    fn from(data: DepartmentCreate) -> Self {
        Self {
            id: 0,
            name: data.name,
            parent_department_id: data.parent_department_id,
            manager_id: data.manager_id,
            external_id: data.external_id,
        }
    }
}
