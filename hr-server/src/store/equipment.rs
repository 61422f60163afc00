use redb::TableDefinition;
use shared::models::Equipment;

use super::{Record, Store, StoreResult};

impl Record for Equipment {
    const ENTITY: &'static str = "equipment";
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = TableDefinition::new("equipment");

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Store {
    pub fn equipment_for_employee(&self, employee_id: u64) -> StoreResult<Vec<Equipment>> {
        self.filter(|e: &Equipment| e.employee_id == Some(employee_id))
    }
}
