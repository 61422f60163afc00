use serde_json::Value;
use shared::models::Department;

use super::fields::{self, EXTERNAL_ID, NAME, PARENT};
use super::{BatchMaps, ImportReport, Kind, Reconciler, objects, reject};
use crate::store::{StoreError, StoreResult};

impl Reconciler {
    pub(super) fn import_departments(
        &self,
        records: &[Value],
        maps: &mut BatchMaps,
        report: &mut ImportReport,
    ) {
        let records = objects(records, Kind::Department, report);

        // Pass 1: upsert by external id, parents untouched
        let mut parents = Vec::new();
        for (i, record) in records {
            let (Some(ext), Some(name)) = (
                fields::text(record, EXTERNAL_ID),
                fields::text(record, NAME),
            ) else {
                reject(report, Kind::Department, &format!("#{}", i), "missing external id or name");
                continue;
            };

            match self.upsert_department(&ext, &name) {
                Ok((id, created)) => {
                    if created {
                        report.departments.created += 1;
                    } else {
                        report.departments.updated += 1;
                    }
                    maps.departments.insert(ext.clone(), id);
                    if let Some(parent) = fields::reference(record, PARENT) {
                        parents.push((id, ext, parent));
                    }
                }
                Err(e) => reject(report, Kind::Department, &ext, e),
            }
        }

        // Pass 2: parents, now that every department of the batch exists
        for (id, ext, parent_ext) in parents {
            let resolved = match maps.departments.get(&parent_ext) {
                Some(pid) => Ok(Some(*pid)),
                None => self.store.id_for_external_id::<Department>(&parent_ext),
            };
            match resolved {
                Ok(Some(parent_id)) if parent_id != id => {
                    if let Err(e) = self.set_parent(id, parent_id) {
                        reject(report, Kind::Department, &ext, e);
                    }
                }
                Ok(_) => {
                    tracing::debug!(
                        target: "import",
                        department = %ext,
                        parent = %parent_ext,
                        "Parent department not resolved"
                    );
                }
                Err(e) => reject(report, Kind::Department, &ext, e),
            }
        }
    }

    /// Returns the id and whether it was newly created
    fn upsert_department(&self, ext: &str, name: &str) -> StoreResult<(u64, bool)> {
        match self.store.find_by_external_id::<Department>(ext)? {
            Some(mut existing) => {
                existing.name = name.to_string();
                self.store.update(&existing)?;
                Ok((existing.id, false))
            }
            None => {
                let mut department = Department::new(name);
                department.external_id = Some(ext.to_string());
                Ok((self.store.insert(department)?.id, true))
            }
        }
    }

    fn set_parent(&self, id: u64, parent_id: u64) -> StoreResult<()> {
        let mut department: Department = self.store.get(id)?.ok_or(StoreError::NotFound {
            entity: "department",
            id,
        })?;
        if department.parent_department_id != Some(parent_id) {
            department.parent_department_id = Some(parent_id);
            self.store.update(&department)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::test_support::*;
    use super::super::{ImportBatch, KindCounts};
    use super::*;

    fn tree() -> Vec<Value> {
        vec![
            json!({"id": "root", "name": "Head office"}),
            json!({"id": "ops", "name": "Operations", "parent_id": "root"}),
            json!({"id": "it", "name": "IT", "parent_id": "ops"}),
            json!({"id": "hr", "name": "HR", "Родитель_Key": "root"}),
        ]
    }

    fn parent_ext(store: &crate::store::Store, ext: &str) -> Option<String> {
        let d: Department = store.find_by_external_id(ext).unwrap().unwrap();
        d.parent_department_id.map(|pid| {
            let p: Department = store.get(pid).unwrap().unwrap();
            p.external_id.unwrap()
        })
    }

    /// Every permutation of `items`
    fn permutations(items: Vec<Value>) -> Vec<Vec<Value>> {
        if items.len() <= 1 {
            return vec![items];
        }
        let mut out = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.clone();
            let head = rest.remove(i);
            for mut tail in permutations(rest) {
                tail.insert(0, head.clone());
                out.push(tail);
            }
        }
        out
    }

    #[tokio::test]
    async fn test_parents_resolved_for_every_ordering() {
        for order in permutations(tree()) {
            let (r, _) = reconciler();
            let batch = ImportBatch {
                departments: order,
                ..Default::default()
            };
            let report = r.import_batch(&batch, false).await;
            assert!(report.is_clean(), "{:?}", report.errors);

            let store = store(&r);
            assert_eq!(parent_ext(store, "root"), None);
            assert_eq!(parent_ext(store, "ops").as_deref(), Some("root"));
            assert_eq!(parent_ext(store, "it").as_deref(), Some("ops"));
            assert_eq!(parent_ext(store, "hr").as_deref(), Some("root"));
        }
    }

    #[tokio::test]
    async fn test_reimport_updates_instead_of_creating() {
        let (r, _) = reconciler();
        let batch = ImportBatch {
            departments: tree(),
            ..Default::default()
        };

        let first = r.import_batch(&batch, false).await;
        assert_eq!(
            first.departments,
            KindCounts { created: 4, updated: 0, errors: 0 }
        );

        let second = r.import_batch(&batch, false).await;
        assert_eq!(
            second.departments,
            KindCounts { created: 0, updated: 4, errors: 0 }
        );
        assert_eq!(store(&r).list::<Department>().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_parent_from_earlier_batch() {
        let (r, _) = reconciler();
        r.import_batch(
            &ImportBatch {
                departments: vec![json!({"Ref_Key": "root", "Description": "Head"})],
                ..Default::default()
            },
            false,
        )
        .await;

        let report = r
            .import_batch(
                &ImportBatch {
                    departments: vec![json!({"Ref_Key": "sub", "Description": "Sub", "Родитель_Key": "root"})],
                    ..Default::default()
                },
                false,
            )
            .await;
        assert!(report.is_clean());
        assert_eq!(parent_ext(store(&r), "sub").as_deref(), Some("root"));
    }

    #[tokio::test]
    async fn test_malformed_records_counted() {
        let (r, _) = reconciler();
        let batch = ImportBatch {
            departments: vec![
                json!({"id": "a", "name": "A"}),
                json!({"name": "no id"}),
                json!({"id": "c"}),
                json!("not an object"),
            ],
            ..Default::default()
        };
        let report = r.import_batch(&batch, false).await;
        assert_eq!(
            report.departments,
            KindCounts { created: 1, updated: 0, errors: 3 }
        );
        assert_eq!(report.errors.len(), 3);
    }
}
