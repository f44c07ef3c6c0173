//! On-disk OSV store: one pretty-printed `{cve_id}.json` per record.
//!
//! The store is also where the [`ModifiedIndex`] comes from: every run
//! starts by reading the `modified` field of the records already on disk.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::harvest::reconcile::ModifiedIndex;
use crate::model::OsvRecord;
use crate::traits::HarvestError;

pub struct OsvStore {
    dir: PathBuf,
}

impl OsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `cve_id`.
    pub fn record_path(&self, cve_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cve_id))
    }

    /// Builds the index of persisted `modified` timestamps.
    ///
    /// A missing directory yields an empty index. Only regular files whose
    /// name contains `CVE-` and ends in `.json` are read.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Persistence`] if the directory or a record
    /// cannot be read, and [`HarvestError::Decode`] if a record is not valid
    /// OSV JSON.
    pub async fn load_index(&self) -> Result<ModifiedIndex, HarvestError> {
        let mut index = ModifiedIndex::new();
        if !tokio::fs::try_exists(&self.dir)
            .await
            .map_err(|e| self.persistence_error(&self.dir, e))?
        {
            debug!(dir = %self.dir.display(), "Store directory missing, starting empty");
            return Ok(index);
        }

        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| self.persistence_error(&self.dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| self.persistence_error(&self.dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| self.persistence_error(&path, e))?;
            if file_type.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !(name.contains("CVE-") && name.ends_with(".json")) {
                continue;
            }

            let record = read_record(&path).await?;
            index.insert(record.id, record.modified);
        }

        info!(dir = %self.dir.display(), records = index.len(), "Loaded modified index");
        Ok(index)
    }

    /// Writes `record` to `{dir}/{id}.json`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Persistence`] on any filesystem failure.
    pub async fn write(&self, record: &OsvRecord) -> Result<PathBuf, HarvestError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| self.persistence_error(&self.dir, e))?;

        let path = self.record_path(&record.id);
        let body = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| self.persistence_error(&path, e))?;

        debug!(path = %path.display(), "Wrote OSV record");
        Ok(path)
    }

    fn persistence_error(&self, path: &Path, source: std::io::Error) -> HarvestError {
        HarvestError::Persistence {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reads one persisted OSV record.
pub async fn read_record(path: &Path) -> Result<OsvRecord, HarvestError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| HarvestError::Persistence {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_slice(&bytes).map_err(|e| HarvestError::Decode {
        source_name: path.display().to_string(),
        reason: e.to_string(),
    })
}
