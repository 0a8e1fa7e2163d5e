//! Capture-and-store flow for the before/after snapshots.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::controller::{SnapshotSource, SourceError};
use crate::snapshot::Role;
use crate::store::{SnapshotStore, StoreError};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("could not fetch AP database from {source_name}: {error}")]
    Source {
        source_name: String,
        #[source]
        error: SourceError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    Stored { path: PathBuf, count: usize },
    /// The user declined to overwrite an existing before snapshot.
    Skipped { path: PathBuf },
}

/// Fetch the AP list from `source` and persist it for `role`.
///
/// An existing before snapshot is only replaced if `confirm` agrees. The
/// question is asked before contacting the controller. The after snapshot is
/// always overwritten.
pub fn capture<S, F>(
    source: &mut S,
    store: &SnapshotStore,
    role: Role,
    confirm: F,
) -> Result<CaptureOutcome, CaptureError>
where
    S: SnapshotSource + ?Sized,
    F: FnOnce(&Path) -> bool,
{
    let path = store.path_for(role);

    if role == Role::Before && store.exists(role) && !confirm(&path) {
        tracing::info!(path = %path.display(), "overwrite declined, capture skipped");
        return Ok(CaptureOutcome::Skipped { path });
    }

    let records = source.fetch_ap_database().map_err(|error| CaptureError::Source {
        source_name: source.name().to_string(),
        error,
    })?;

    let count = records.len();
    let path = store.save(role, &records)?;
    Ok(CaptureOutcome::Stored { path, count })
}
