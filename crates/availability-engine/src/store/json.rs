//! JSON snapshot persistence for [`MemoryStore`].
//!
//! The whole store is read on open and written back on [`JsonStore::save`].
//! Saving goes through a sibling temp file and a rename, so a crash mid-write
//! leaves the previous snapshot intact.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{AvailabilitySlot, BookedLesson, MemoryStore, Profile};
use crate::error::{AvailabilityError, Result};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    users: Vec<Profile>,
    #[serde(default)]
    availability: Vec<AvailabilitySlot>,
    #[serde(default)]
    lessons: Vec<BookedLesson>,
}

/// A [`MemoryStore`] bound to a snapshot file.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    store: MemoryStore,
}

impl JsonStore {
    /// Load the snapshot at `path`. A missing file opens an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::Store`] if the file cannot be read or
    /// decoded, or the matching duplicate error if the snapshot breaks a
    /// uniqueness invariant.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            debug!(path = %path.display(), "no snapshot yet, starting empty");
            return Ok(JsonStore {
                path,
                store: MemoryStore::new(),
            });
        }

        let raw = fs::read_to_string(&path).map_err(|e| {
            AvailabilityError::Store(format!("failed to read {}: {e}", path.display()))
        })?;
        let snapshot: Snapshot = serde_json::from_str(&raw).map_err(|e| {
            AvailabilityError::Store(format!("failed to decode {}: {e}", path.display()))
        })?;
        let store =
            MemoryStore::from_records(snapshot.users, snapshot.availability, snapshot.lessons)?;

        debug!(
            path = %path.display(),
            users = store.users().len(),
            slots = store.slots().len(),
            lessons = store.lessons().len(),
            "loaded snapshot"
        );
        Ok(JsonStore { path, store })
    }

    /// Write the current state back to the snapshot file.
    pub fn save(&self) -> Result<()> {
        let snapshot = Snapshot {
            users: self.store.users().to_vec(),
            availability: self.store.slots().to_vec(),
            lessons: self.store.lessons().to_vec(),
        };
        let body = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| AvailabilityError::Store(format!("failed to encode snapshot: {e}")))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                AvailabilityError::Store(format!("failed to create {}: {e}", dir.display()))
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| {
            AvailabilityError::Store(format!("failed to write {}: {e}", tmp.display()))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            AvailabilityError::Store(format!("failed to replace {}: {e}", self.path.display()))
        })?;

        info!(path = %self.path.display(), "saved snapshot");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MemoryStore {
        &mut self.store
    }
}
