use serde_json::Value;
use shared::models::{Department, Position};

use super::fields::{self, DEPARTMENT_REF, EXTERNAL_ID, NAME};
use super::{BatchMaps, ImportReport, Kind, Reconciler, objects, reject};
use crate::store::StoreResult;

impl Reconciler {
    pub(super) fn import_positions(
        &self,
        records: &[Value],
        maps: &mut BatchMaps,
        report: &mut ImportReport,
    ) {
        for (i, record) in objects(records, Kind::Position, report) {
            let (Some(ext), Some(name)) = (
                fields::text(record, EXTERNAL_ID),
                fields::text(record, NAME),
            ) else {
                reject(report, Kind::Position, &format!("#{}", i), "missing external id or name");
                continue;
            };

            let result = fields::reference(record, DEPARTMENT_REF)
                .map(|dept| self.resolve_department(maps, &dept))
                .transpose()
                .and_then(|department_id| {
                    self.upsert_position(&ext, &name, department_id.flatten())
                });

            match result {
                Ok((id, created)) => {
                    if created {
                        report.positions.created += 1;
                    } else {
                        report.positions.updated += 1;
                    }
                    maps.positions.insert(ext, id);
                }
                Err(e) => reject(report, Kind::Position, &ext, e),
            }
        }
    }

    /// Batch map first, then the store index
    pub(super) fn resolve_department(&self, maps: &BatchMaps, ext: &str) -> StoreResult<Option<u64>> {
        match maps.departments.get(ext) {
            Some(id) => Ok(Some(*id)),
            None => self.store.id_for_external_id::<Department>(ext),
        }
    }

    pub(super) fn resolve_position(&self, maps: &BatchMaps, ext: &str) -> StoreResult<Option<u64>> {
        match maps.positions.get(ext) {
            Some(id) => Ok(Some(*id)),
            None => self.store.id_for_external_id::<Position>(ext),
        }
    }

    /// An unresolved department keeps whatever the position had
    fn upsert_position(
        &self,
        ext: &str,
        name: &str,
        department_id: Option<u64>,
    ) -> StoreResult<(u64, bool)> {
        match self.store.find_by_external_id::<Position>(ext)? {
            Some(mut existing) => {
                existing.name = name.to_string();
                if department_id.is_some() {
                    existing.department_id = department_id;
                }
                self.store.update(&existing)?;
                Ok((existing.id, false))
            }
            None => {
                let mut position = Position::new(name);
                position.external_id = Some(ext.to_string());
                position.department_id = department_id;
                Ok((self.store.insert(position)?.id, true))
            }
        }
    }
}
