//! File-based import: inline JSON, single files and drop directories

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{ImportBatch, ImportReport, Reconciler};
use crate::utils::time::archive_stamp;

/// Subdirectory receiving successfully imported files
pub const PROCESSED_DIR: &str = "processed";

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Import directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// `{stem}_{stamp}.json`, or `{stem}_{stamp}_{n}.json` when earlier
/// archives of the same second exist
async fn free_archive_path(processed: &Path, stem: &str, stamp: &str) -> std::io::Result<PathBuf> {
    let mut target = processed.join(format!("{}_{}.json", stem, stamp));
    let mut n = 1;
    while tokio::fs::try_exists(&target).await? {
        target = processed.join(format!("{}_{}_{}.json", stem, stamp, n));
        n += 1;
    }
    Ok(target)
}

impl Reconciler {
    /// Import an inline payload `{departments?, positions?, employees?}`
    pub async fn import_value(&self, payload: Value, create_hr_requests: bool) -> ImportReport {
        if !payload.is_object() {
            return ImportReport::failed("payload must be a JSON object");
        }
        match serde_json::from_value::<ImportBatch>(payload) {
            Ok(batch) => self.import_batch(&batch, create_hr_requests).await,
            Err(e) => ImportReport::failed(format!("invalid payload: {}", e)),
        }
    }

    /// Import one JSON file. Read and parse failures end up in the report.
    pub async fn import_file(&self, path: &Path, create_hr_requests: bool) -> ImportReport {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(target: "import", path = %path.display(), error = %e, "Cannot read import file");
                return ImportReport::failed(format!("cannot read {}: {}", path.display(), e));
            }
        };
        match serde_json::from_slice::<Value>(&raw) {
            Ok(payload) => self.import_value(payload, create_hr_requests).await,
            Err(e) => {
                tracing::warn!(target: "import", path = %path.display(), error = %e, "Invalid import file");
                ImportReport::failed(format!("invalid JSON in {}: {}", path.display(), e))
            }
        }
    }

    /// Import every `*.json` file of `dir` in name order.
    ///
    /// With `archive`, a file imported without errors moves to
    /// `processed/{stem}_{YYYYmmdd_HHMMSS}.json`; files with errors stay.
    pub async fn import_directory(
        &self,
        dir: &Path,
        create_hr_requests: bool,
        archive: bool,
    ) -> Result<BTreeMap<String, ImportReport>, ImportError> {
        if !tokio::fs::try_exists(dir).await? {
            return Err(ImportError::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file()
                && path.extension().is_some_and(|ext| ext == "json")
            {
                files.push(path);
            }
        }
        files.sort();

        let mut reports = BTreeMap::new();
        for path in files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let report = self.import_file(&path, create_hr_requests).await;

            if archive && report.is_clean() {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let processed = dir.join(PROCESSED_DIR);
                tokio::fs::create_dir_all(&processed).await?;
                let target = free_archive_path(&processed, &stem, &archive_stamp()).await?;
                tokio::fs::rename(&path, &target).await?;
                tracing::info!(target: "import", file = %name, archived = %target.display(), "Import file archived");
            }
            reports.insert(name, report);
        }
        Ok(reports)
    }
}
