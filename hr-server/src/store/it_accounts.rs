use redb::{TableDefinition, WriteTransaction};
use shared::models::ItAccount;

use super::{Record, Store, StoreResult};

impl Record for ItAccount {
    const ENTITY: &'static str = "it_account";
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = TableDefinition::new("it_accounts");

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Store {
    pub fn accounts_for_employee(&self, employee_id: u64) -> StoreResult<Vec<ItAccount>> {
        self.filter(|a: &ItAccount| a.employee_id == employee_id)
    }

    pub fn accounts_for_employee_in(
        txn: &WriteTransaction,
        employee_id: u64,
    ) -> StoreResult<Vec<ItAccount>> {
        Store::filter_in(txn, |a: &ItAccount| a.employee_id == employee_id)
    }
}
