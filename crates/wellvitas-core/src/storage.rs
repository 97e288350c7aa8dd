//! Persisted snapshot of an in-progress booking
//!
//! The snapshot lives in a single JSON file named after [`SNAPSHOT_KEY`]. It
//! is always written whole (temp file, then rename) and validated against the
//! typed schema on load; anything that does not fit is discarded.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::BookingConfig;
use crate::error::BookingError;
use crate::types::{BookingState, Enquiry, Programme, Screening, Stage, Taster};

/// Storage namespace for the snapshot
pub const SNAPSHOT_KEY: &str = "wellvitas_booking_v2";

/// On-disk form of a [`BookingState`], without transient errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Legacy snapshots used `step`
    #[serde(default, alias = "step")]
    pub stage: Stage,
    #[serde(default)]
    pub enquiry: Enquiry,
    #[serde(default)]
    pub screening: Screening,
    #[serde(default)]
    pub taster: Taster,
    #[serde(default)]
    pub programme: Programme,
    #[serde(default)]
    pub accepted: bool,
    /// RFC 3339 time of the write
    #[serde(default)]
    pub saved_at: Option<String>,
}

impl Snapshot {
    pub fn from_state(state: &BookingState, saved_at: String) -> Self {
        Self {
            stage: state.stage,
            enquiry: state.enquiry.clone(),
            screening: state.screening.clone(),
            taster: state.taster.clone(),
            programme: state.programme,
            accepted: state.accepted,
            saved_at: Some(saved_at),
        }
    }

    pub fn into_state(self) -> BookingState {
        BookingState {
            stage: self.stage,
            enquiry: self.enquiry,
            screening: self.screening,
            taster: self.taster,
            programme: self.programme,
            accepted: self.accepted,
            errors: Vec::new(),
        }
    }
}

/// Parse a stored snapshot, rejecting anything outside the schema
pub fn parse_snapshot(content: &str) -> Option<Snapshot> {
    match serde_json::from_str::<Snapshot>(content) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable booking snapshot");
            None
        }
    }
}

/// File-backed snapshot store
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Store the snapshot inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{}.json", SNAPSHOT_KEY)),
        }
    }

    /// Store under the configured directory, or `<data dir>/wellvitas`
    pub fn from_config(config: &BookingConfig) -> Result<Self, BookingError> {
        let dir = match &config.storage_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .ok_or(BookingError::StorageUnavailable)?
                .join("wellvitas"),
        };
        Ok(Self::in_dir(&dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the snapshot; missing, unreadable or malformed files yield `None`
    pub fn load(&self) -> Option<Snapshot> {
        if !self.path.exists() {
            return None;
        }
        match fs::read_to_string(&self.path) {
            Ok(content) => parse_snapshot(&content),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read booking snapshot");
                None
            }
        }
    }

    /// Replace the snapshot atomically
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), BookingError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(snapshot)?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::trace!(path = %self.path.display(), stage = %snapshot.stage, "saved booking snapshot");
        Ok(())
    }

    /// Delete the snapshot; succeeds when there is nothing to delete
    pub fn clear(&self) -> Result<(), BookingError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            tracing::debug!(path = %self.path.display(), "cleared booking snapshot");
        }
        Ok(())
    }
}
