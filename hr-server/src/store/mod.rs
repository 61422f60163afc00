//! redb-based entity store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `departments` | `id` | `Department` | Department tree |
//! | `positions` | `id` | `Position` | Job positions |
//! | `employees` | `id` | `Employee` | Employees |
//! | `hr_requests` | `id` | `HrRequest` | Hire/fire requests |
//! | `it_accounts` | `id` | `ItAccount` | Provisioned accounts |
//! | `equipment` | `id` | `Equipment` | Equipment inventory |
//! | `audit_log` | `id` | `AuditEntry` | Append-only audit trail |
//! | `external_ids` | `(entity, external_id)` | `id` | Unique external id index |
//! | `sequences` | `entity` | `u64` | Last issued id per entity |
//!
//! Records are stored as JSON and refer to each other by id only.
//! Every `*_in` function works inside a caller-owned [`WriteTransaction`]
//! so several records can be committed atomically.

mod audit;
mod departments;
mod employees;
mod equipment;
mod hr_requests;
mod it_accounts;
mod positions;

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for external id index: key = (entity, external_id), value = record id
const EXTERNAL_IDS_TABLE: TableDefinition<(&str, &str), u64> =
    TableDefinition::new("external_ids");

/// Table for id sequences: key = entity, value = last issued id
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequences");

/// A record kept in its own table, addressed by a store-issued `u64` id.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Entity name used in errors, the sequence table and the external id index
    const ENTITY: &'static str;
    const TABLE: TableDefinition<'static, u64, &'static [u8]>;

    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);

    /// External system key, unique per entity when present
    fn external_id(&self) -> Option<&str> {
        None
    }
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: u64 },

    #[error("{entity} with external id '{external_id}' already exists")]
    Duplicate {
        entity: &'static str,
        external_id: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Entity store backed by redb
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// In-memory database, used by tests
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StoreResult<Self> {
        let write_txn = db.begin_write()?;
        {
            // Create all tables if they don't exist
            let _ = write_txn.open_table(shared::models::Department::TABLE)?;
            let _ = write_txn.open_table(shared::models::Position::TABLE)?;
            let _ = write_txn.open_table(shared::models::Employee::TABLE)?;
            let _ = write_txn.open_table(shared::models::HrRequest::TABLE)?;
            let _ = write_txn.open_table(shared::models::ItAccount::TABLE)?;
            let _ = write_txn.open_table(shared::models::Equipment::TABLE)?;
            let _ = write_txn.open_table(shared::models::AuditEntry::TABLE)?;
            let _ = write_txn.open_table(EXTERNAL_IDS_TABLE)?;
            let _ = write_txn.open_table(SEQUENCE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Run `f` inside one write transaction and commit it.
    ///
    /// Nothing is persisted when `f` returns an error.
    pub fn write<T>(&self, f: impl FnOnce(&WriteTransaction) -> StoreResult<T>) -> StoreResult<T> {
        let txn = self.db.begin_write()?;
        let out = f(&txn)?;
        txn.commit()?;
        Ok(out)
    }

    // ========== Generic record operations ==========

    /// Insert a new record, assigning it a fresh id
    pub fn insert<R: Record>(&self, record: R) -> StoreResult<R> {
        self.write(|txn| Self::insert_in(txn, record))
    }

    pub fn insert_in<R: Record>(txn: &WriteTransaction, mut record: R) -> StoreResult<R> {
        let id = Self::next_id_in(txn, R::ENTITY)?;
        record.set_id(id);
        if let Some(ext) = record.external_id() {
            Self::claim_external_id_in::<R>(txn, ext, id)?;
        }
        let bytes = serde_json::to_vec(&record)?;
        let mut table = txn.open_table(R::TABLE)?;
        table.insert(id, bytes.as_slice())?;
        Ok(record)
    }

    pub fn get<R: Record>(&self, id: u64) -> StoreResult<Option<R>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(R::TABLE)?;
        read_record(&table, id)
    }

    pub fn get_in<R: Record>(txn: &WriteTransaction, id: u64) -> StoreResult<Option<R>> {
        let table = txn.open_table(R::TABLE)?;
        read_record(&table, id)
    }

    /// Get a record or fail with [`StoreError::NotFound`]
    pub fn require<R: Record>(&self, id: u64) -> StoreResult<R> {
        self.get(id)?.ok_or(StoreError::NotFound {
            entity: R::ENTITY,
            id,
        })
    }

    /// Overwrite an existing record, keeping the external id index in step
    pub fn update<R: Record>(&self, record: &R) -> StoreResult<()> {
        self.write(|txn| Self::update_in(txn, record))
    }

    pub fn update_in<R: Record>(txn: &WriteTransaction, record: &R) -> StoreResult<()> {
        let id = record.id();
        let previous: R = Self::get_in(txn, id)?.ok_or(StoreError::NotFound {
            entity: R::ENTITY,
            id,
        })?;

        if previous.external_id() != record.external_id() {
            if let Some(ext) = record.external_id() {
                Self::claim_external_id_in::<R>(txn, ext, id)?;
            }
            if let Some(old) = previous.external_id() {
                let mut index = txn.open_table(EXTERNAL_IDS_TABLE)?;
                index.remove((R::ENTITY, old))?;
            }
        }

        let bytes = serde_json::to_vec(record)?;
        let mut table = txn.open_table(R::TABLE)?;
        table.insert(id, bytes.as_slice())?;
        Ok(())
    }

    /// Delete a record. Returns whether it existed.
    pub fn delete<R: Record>(&self, id: u64) -> StoreResult<bool> {
        self.write(|txn| Self::delete_in::<R>(txn, id))
    }

    pub fn delete_in<R: Record>(txn: &WriteTransaction, id: u64) -> StoreResult<bool> {
        let removed: Option<R> = {
            let mut table = txn.open_table(R::TABLE)?;
            let guard = table.remove(id)?;
            match guard {
                Some(g) => Some(serde_json::from_slice(g.value())?),
                None => None,
            }
        };
        match removed {
            Some(record) => {
                if let Some(ext) = record.external_id() {
                    let mut index = txn.open_table(EXTERNAL_IDS_TABLE)?;
                    index.remove((R::ENTITY, ext))?;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// All records in id order
    pub fn list<R: Record>(&self) -> StoreResult<Vec<R>> {
        self.filter(|_: &R| true)
    }

    /// Records matching `pred`, in id order
    pub fn filter<R: Record>(&self, pred: impl Fn(&R) -> bool) -> StoreResult<Vec<R>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(R::TABLE)?;
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let record: R = serde_json::from_slice(value.value())?;
            if pred(&record) {
                out.push(record);
            }
        }
        Ok(out)
    }

    pub fn filter_in<R: Record>(
        txn: &WriteTransaction,
        pred: impl Fn(&R) -> bool,
    ) -> StoreResult<Vec<R>> {
        let table = txn.open_table(R::TABLE)?;
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let record: R = serde_json::from_slice(value.value())?;
            if pred(&record) {
                out.push(record);
            }
        }
        Ok(out)
    }

    /// Id of the record holding `external_id`, via the unique index
    pub fn id_for_external_id<R: Record>(&self, external_id: &str) -> StoreResult<Option<u64>> {
        let txn = self.db.begin_read()?;
        let index = txn.open_table(EXTERNAL_IDS_TABLE)?;
        Ok(index.get((R::ENTITY, external_id))?.map(|g| g.value()))
    }

    pub fn id_for_external_id_in<R: Record>(
        txn: &WriteTransaction,
        external_id: &str,
    ) -> StoreResult<Option<u64>> {
        let index = txn.open_table(EXTERNAL_IDS_TABLE)?;
        Ok(index.get((R::ENTITY, external_id))?.map(|g| g.value()))
    }

    pub fn find_by_external_id<R: Record>(&self, external_id: &str) -> StoreResult<Option<R>> {
        match self.id_for_external_id::<R>(external_id)? {
            Some(id) => self.get(id),
            None => Ok(None),
        }
    }

    pub fn find_by_external_id_in<R: Record>(
        txn: &WriteTransaction,
        external_id: &str,
    ) -> StoreResult<Option<R>> {
        match Self::id_for_external_id_in::<R>(txn, external_id)? {
            Some(id) => Self::get_in(txn, id),
            None => Ok(None),
        }
    }

    // ========== Internal helpers ==========

    fn next_id_in(txn: &WriteTransaction, entity: &str) -> StoreResult<u64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table.get(entity)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(entity, next)?;
        Ok(next)
    }

    fn claim_external_id_in<R: Record>(
        txn: &WriteTransaction,
        external_id: &str,
        id: u64,
    ) -> StoreResult<()> {
        let mut index = txn.open_table(EXTERNAL_IDS_TABLE)?;
        let owner = index.get((R::ENTITY, external_id))?.map(|g| g.value());
        match owner {
            Some(owner) if owner != id => Err(StoreError::Duplicate {
                entity: R::ENTITY,
                external_id: external_id.to_string(),
            }),
            _ => {
                index.insert((R::ENTITY, external_id), id)?;
                Ok(())
            }
        }
    }
}

fn read_record<R, T>(table: &T, id: u64) -> StoreResult<Option<R>>
where
    R: Record,
    T: ReadableTable<u64, &'static [u8]>,
{
    table
        .get(id)?
        .map(|guard| serde_json::from_slice(guard.value()))
        .transpose()
        .map_err(StoreError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Department, Employee, Position};

    fn dept(name: &str, ext: Option<&str>) -> Department {
        let mut d = Department::new(name);
        d.external_id = ext.map(String::from);
        d
    }

    #[test]
    fn test_insert_assigns_sequential_ids_per_entity() {
        let store = Store::open_in_memory().unwrap();

        let a = store.insert(dept("A", None)).unwrap();
        let b = store.insert(dept("B", None)).unwrap();
        let p = store.insert(Position::new("Engineer")).unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(p.id, 1);
        assert_eq!(store.list::<Department>().unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_external_id_rejected() {
        let store = Store::open_in_memory().unwrap();
        store.insert(dept("A", Some("D1"))).unwrap();

        let err = store.insert(dept("B", Some("D1"))).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        // Failed insert leaves nothing behind
        assert_eq!(store.list::<Department>().unwrap().len(), 1);

        // Same external id on a different entity kind is fine
        let mut p = Position::new("X");
        p.external_id = Some("D1".into());
        store.insert(p).unwrap();
    }

    #[test]
    fn test_update_maintains_index() {
        let store = Store::open_in_memory().unwrap();
        let mut a = store.insert(dept("A", Some("D1"))).unwrap();

        a.external_id = Some("D2".into());
        store.update(&a).unwrap();

        assert!(store.find_by_external_id::<Department>("D1").unwrap().is_none());
        assert_eq!(
            store.find_by_external_id::<Department>("D2").unwrap().unwrap().id,
            a.id
        );

        a.external_id = None;
        store.update(&a).unwrap();
        assert!(store.find_by_external_id::<Department>("D2").unwrap().is_none());

        // Freed id can be reused
        store.insert(dept("B", Some("D2"))).unwrap();
    }

    #[test]
    fn test_update_to_taken_external_id_fails() {
        let store = Store::open_in_memory().unwrap();
        store.insert(dept("A", Some("D1"))).unwrap();
        let mut b = store.insert(dept("B", Some("D2"))).unwrap();

        b.external_id = Some("D1".into());
        let err = store.update(&b).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));

        let stored: Department = store.require(b.id).unwrap();
        assert_eq!(stored.external_id.as_deref(), Some("D2"));
    }

    #[test]
    fn test_update_missing_record() {
        let store = Store::open_in_memory().unwrap();
        let mut e = Employee::new("Nobody");
        e.id = 42;
        assert!(matches!(
            store.update(&e).unwrap_err(),
            StoreError::NotFound { entity: "employee", id: 42 }
        ));
    }

    #[test]
    fn test_delete_releases_external_id() {
        let store = Store::open_in_memory().unwrap();
        let a = store.insert(dept("A", Some("D1"))).unwrap();

        assert!(store.delete::<Department>(a.id).unwrap());
        assert!(!store.delete::<Department>(a.id).unwrap());
        assert!(store.id_for_external_id::<Department>("D1").unwrap().is_none());
    }

    #[test]
    fn test_write_rolls_back_on_error() {
        let store = Store::open_in_memory().unwrap();

        let result: StoreResult<()> = store.write(|txn| {
            Store::insert_in(txn, dept("A", None))?;
            Err(StoreError::Conflict("abort".into()))
        });
        assert!(result.is_err());
        assert!(store.list::<Department>().unwrap().is_empty());
    }

    #[test]
    fn test_reopen_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hr.redb");
        {
            let store = Store::open(&path).unwrap();
            store.insert(dept("A", Some("D1"))).unwrap();
        }
        let store = Store::open(&path).unwrap();
        let found: Department = store.find_by_external_id("D1").unwrap().unwrap();
        assert_eq!(found.name, "A");
    }
}
