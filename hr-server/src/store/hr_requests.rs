use chrono::NaiveDate;
use redb::TableDefinition;
use shared::models::HrRequest;

use super::{Record, Store, StoreResult};

impl Record for HrRequest {
    const ENTITY: &'static str = "hr_request";
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = TableDefinition::new("hr_requests");

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Store {
    /// Requests not yet done whose effective date is on or before `today`
    pub fn due_requests(&self, today: NaiveDate) -> StoreResult<Vec<HrRequest>> {
        self.filter(|r: &HrRequest| r.is_due(today))
    }
}
