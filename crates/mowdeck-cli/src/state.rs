//! Persisted numeric control values, restored on the next start.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use mowdeck_controls::{ControlSnapshot, NumberSnapshot};
use mowdeck_types::MowerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub saved_at: DateTime<Utc>,
    pub numbers: Vec<NumberSnapshot>,
}

impl SavedState {
    /// Keep only the numeric snapshots.
    pub fn from_snapshots(snapshots: Vec<ControlSnapshot>) -> Self {
        let numbers = snapshots
            .into_iter()
            .filter_map(|s| match s {
                ControlSnapshot::Number(n) => Some(n),
                ControlSnapshot::Button(_) => None,
            })
            .collect();
        Self {
            saved_at: Utc::now(),
            numbers,
        }
    }
}

/// Load the saved state.  Returns `None` if the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<SavedState>, MowerError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        MowerError::Config(format!("failed to read state at {}: {e}", path.display()))
    })?;
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| MowerError::Config(format!("failed to parse state at {}: {e}", path.display())))
}

pub fn save_to(state: &SavedState, path: &Path) -> Result<(), MowerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| MowerError::Config(format!("failed to create state directory: {e}")))?;
    }
    let raw = serde_json::to_vec_pretty(state)
        .map_err(|e| MowerError::Config(format!("failed to serialize state: {e}")))?;
    write_private(path, &raw)
        .map_err(|e| MowerError::Config(format!("failed to write state at {}: {e}", path.display())))
}

/// Write `data` to `path`, owner read/write only on Unix.
pub(crate) fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(data))
    }
    #[cfg(not(unix))]
    {
        fs::write(path, data)
    }
}
