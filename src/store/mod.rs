//! Flat-file snapshot storage.
//!
//! Each snapshot lives in its own JSON file in the snapshot directory:
//! - before.json: captured ahead of the maintenance window
//! - after.json: captured once the work is done
//!
//! The file's modification time doubles as the capture timestamp.

pub mod diff;

use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::snapshot::{ApDatabase, ApRecord, Role, Snapshot};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot file {} was not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("snapshot file {} is malformed: {reason}", .path.display())]
    MalformedData { path: PathBuf, reason: String },

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound { path: path.to_path_buf() }
        } else {
            StoreError::Io { path: path.to_path_buf(), source }
        }
    }
}

/// Write records to `location`, replacing whatever was there.
pub fn store(location: &Path, records: &[ApRecord]) -> Result<(), StoreError> {
    if let Some(parent) = location.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let database = ApDatabase { records: records.to_vec() };
    let json = serde_json::to_string_pretty(&database)
        .map_err(|e| StoreError::io(location, e.into()))?;

    fs::write(location, json).map_err(|e| StoreError::io(location, e))?;
    tracing::info!(path = %location.display(), records = records.len(), "snapshot stored");
    Ok(())
}

/// Read a snapshot file. The returned snapshot carries the file's mtime.
pub fn load(location: &Path, role: Role) -> Result<Snapshot, StoreError> {
    let contents = fs::read_to_string(location).map_err(|e| StoreError::io(location, e))?;

    let database: ApDatabase =
        serde_json::from_str(&contents).map_err(|e| StoreError::MalformedData {
            path: location.to_path_buf(),
            reason: e.to_string(),
        })?;

    let snapshot = Snapshot::new(role, database.records).with_timestamp(timestamp_of(location)?);

    let duplicates = snapshot.duplicate_names();
    if !duplicates.is_empty() {
        tracing::warn!(
            path = %location.display(),
            names = ?duplicates,
            "duplicate AP names in snapshot, last record wins"
        );
    }

    tracing::debug!(path = %location.display(), role = %role, records = snapshot.len(), "snapshot loaded");
    Ok(snapshot)
}

/// Last modification time of `location`.
pub fn timestamp_of(location: &Path) -> Result<DateTime<Utc>, StoreError> {
    let modified = fs::metadata(location)
        .and_then(|meta| meta.modified())
        .map_err(|e| StoreError::io(location, e))?;
    Ok(DateTime::<Utc>::from(modified))
}

/// Snapshot directory with one file per role.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, role: Role) -> PathBuf {
        self.dir.join(role.file_name())
    }

    pub fn exists(&self, role: Role) -> bool {
        self.path_for(role).exists()
    }

    pub fn save(&self, role: Role, records: &[ApRecord]) -> Result<PathBuf, StoreError> {
        let path = self.path_for(role);
        store(&path, records)?;
        Ok(path)
    }

    pub fn load(&self, role: Role) -> Result<Snapshot, StoreError> {
        load(&self.path_for(role), role)
    }
}
