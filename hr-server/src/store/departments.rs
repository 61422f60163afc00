use redb::TableDefinition;
use shared::models::Department;

use super::{Record, Store, StoreError, StoreResult};

impl Record for Department {
    const ENTITY: &'static str = "department";
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = TableDefinition::new("departments");

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

impl Store {
    /// First department with exactly this name
    pub fn find_department_by_name(&self, name: &str) -> StoreResult<Option<Department>> {
        Ok(self
            .filter(|d: &Department| d.name == name)?
            .into_iter()
            .next())
    }

    pub fn child_departments(&self, parent_id: u64) -> StoreResult<Vec<Department>> {
        self.filter(|d: &Department| d.parent_department_id == Some(parent_id))
    }

    /// Delete a department that has no children
    pub fn delete_department(&self, id: u64) -> StoreResult<()> {
        self.write(|txn| {
            let children =
                Store::filter_in(txn, |d: &Department| d.parent_department_id == Some(id))?;
            if !children.is_empty() {
                return Err(StoreError::Conflict(format!(
                    "department {} has {} child department(s)",
                    id,
                    children.len()
                )));
            }
            if !Store::delete_in::<Department>(txn, id)? {
                return Err(StoreError::NotFound {
                    entity: Department::ENTITY,
                    id,
                });
            }
            Ok(())
        })
    }
}
