use redb::{ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::AuditEntry;

use super::{Record, Store, StoreResult};

impl Record for AuditEntry {
    const ENTITY: &'static str = "audit";
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = TableDefinition::new("audit_log");

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Store {
    /// Append an audit entry
    pub fn audit(
        &self,
        user: &str,
        action: &str,
        entity: &str,
        details: Option<String>,
    ) -> StoreResult<AuditEntry> {
        self.insert(AuditEntry::new(user, action, entity, details))
    }

    /// Most recent entries first
    pub fn recent_audit(&self, limit: usize) -> StoreResult<Vec<AuditEntry>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(AuditEntry::TABLE)?;
        let mut out = Vec::with_capacity(limit.min(256));
        for entry in table.iter()?.rev().take(limit) {
            let (_, value) = entry?;
            out.push(serde_json::from_slice(value.value())?);
        }
        Ok(out)
    }
}
