//! Persistence of the status snapshot between passes.
//!
//! The snapshot is a JSON object mapping target name to `{"ok": bool}`. It is
//! read once at the start of a pass and replaced in full at the end.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::monitor::state::StatusSnapshot;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read status file {path}: {reason}")]
    Read { path: PathBuf, reason: String },
    #[error("Failed to parse status file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
    #[error("Failed to serialize status snapshot: {0}")]
    Serialize(String),
    #[error("Failed to write status file {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Load and save the prior status snapshot.
pub trait StatusStore: Send + Sync {
    fn load(&self) -> Result<StatusSnapshot, StoreError>;
    fn save(&self, snapshot: &StatusSnapshot) -> Result<(), StoreError>;
}

/// JSON file store with write-then-rename replacement.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StatusStore for JsonFileStore {
    fn load(&self) -> Result<StatusSnapshot, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No status file, starting empty");
                return Ok(StatusSnapshot::new());
            }
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(StatusSnapshot::new());
        }

        let snapshot: StatusSnapshot =
            serde_json::from_str(&content).map_err(|e| StoreError::Parse {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        debug!(path = %self.path.display(), entries = snapshot.len(), "Loaded status file");
        Ok(snapshot)
    }

    fn save(&self, snapshot: &StatusSnapshot) -> Result<(), StoreError> {
        let write_err = |e: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            reason: e.to_string(),
        };

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp = self.temp_path();
        fs::write(&tmp, json + "\n").map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;

        debug!(path = %self.path.display(), entries = snapshot.len(), "Saved status file");
        Ok(())
    }
}
