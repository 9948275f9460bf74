//! Per-key CSV datasets on disk.

pub mod merge;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::constants::{DATASET_EXTENSION, OFFERS_SUBDIR};
use crate::error::{Error, Result};
use crate::records::{DatasetKey, Record, RecordKind};
use crate::state::KeyLocks;

pub use merge::{dedup_keep_first, merge};

/// Counts from one read-merge-write cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub fetched: usize,
    pub existing: usize,
    pub merged: usize,
    pub created: bool,
}

impl MergeSummary {
    /// Records that were not in the history before.
    pub fn added(&self) -> usize {
        self.merged.saturating_sub(self.existing)
    }
}

#[derive(Clone)]
pub struct DatasetStore {
    root: PathBuf,
    locks: KeyLocks,
}

impl DatasetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: KeyLocks::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/[offers/]<card_type>/<season>/<entity_name>.csv`
    pub fn path_for(&self, key: &DatasetKey, kind: RecordKind) -> PathBuf {
        let mut path = self.root.clone();
        if kind == RecordKind::Offers {
            path.push(OFFERS_SUBDIR);
        }
        path.push(&key.card_type);
        path.push(key.season.to_string());
        path.push(format!("{}.{}", key.entity_name, DATASET_EXTENSION));
        path
    }

    /// The persisted history for `key`, or `None` if nothing was ingested yet.
    pub fn load<R: Record>(&self, key: &DatasetKey) -> Result<Option<Vec<R>>> {
        let path = self.path_for(key, R::KIND);
        if !path.exists() {
            return Ok(None);
        }
        read_dataset(&path).map(Some)
    }

    /// Replace the dataset for `key` with `records`.
    pub fn write<R: Record>(&self, key: &DatasetKey, records: &[R]) -> Result<()> {
        write_dataset(&self.path_for(key, R::KIND), records)
    }

    /// Merge `fresh` into the stored history and overwrite the file.
    ///
    /// A history that cannot be read aborts the merge and leaves the file as
    /// it was.
    pub async fn merge_and_persist<R: Record>(
        &self,
        key: &DatasetKey,
        fresh: Vec<R>,
    ) -> Result<MergeSummary> {
        let path = self.path_for(key, R::KIND);
        let lock = self.locks.lock_for(&path);
        let _guard = lock.lock().await;

        let existing = self.load::<R>(key)?;
        let summary_existing = existing.as_ref().map_or(0, Vec::len);
        let created = existing.is_none();
        let fetched = fresh.len();

        let merged = merge(fresh, existing);
        write_dataset(&path, &merged)?;

        debug!(
            "Wrote {} {} records to {}",
            merged.len(),
            R::KIND,
            path.display()
        );

        Ok(MergeSummary {
            fetched,
            existing: summary_existing,
            merged: merged.len(),
            created,
        })
    }
}

fn read_dataset<R: Record>(path: &Path) -> Result<Vec<R>> {
    let corrupt = |reason: String| Error::DataCorruption {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers().map_err(|e| corrupt(e.to_string()))?;
    if !headers.iter().eq(R::FIELDS.iter().copied()) {
        return Err(corrupt(format!(
            "expected header {:?}, found {:?}",
            R::FIELDS,
            headers.iter().collect::<Vec<_>>()
        )));
    }

    reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| row.map_err(|e| corrupt(format!("row {}: {}", i + 1, e))))
        .collect()
}

fn write_dataset<R: Record>(path: &Path, records: &[R]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::Other(format!("Dataset path has no parent: {}", path.display())))?;
    fs::create_dir_all(dir)?;

    // Written beside the target and renamed over it, so readers never see a
    // half-written file.
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file_mut());
        writer.write_record(R::FIELDS).map_err(csv_io)?;
        for record in records {
            writer.serialize(record).map_err(csv_io)?;
        }
        writer.flush()?;
    }
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

fn csv_io(e: csv::Error) -> Error {
    Error::Io(e.into())
}
