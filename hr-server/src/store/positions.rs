use redb::TableDefinition;
use shared::models::Position;

use super::{Record, Store, StoreResult};

impl Record for Position {
    const ENTITY: &'static str = "position";
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = TableDefinition::new("positions");

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
    pub fn find_position_by_name(&self, name: &str) -> StoreResult<Option<Position>> {
        Ok(self
            .filter(|p: &Position| p.name == name)?
            .into_iter()
            .next())
    }
}
