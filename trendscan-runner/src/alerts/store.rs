//! Alert history persistence.
//!
//! - [`JsonFileStore`]: pretty-printed JSON file, atomic writes (write to
//!   `.tmp`, rename into place). A missing file is an empty history; an
//!   unreadable one is an error, never silently reset.
//! - [`MemoryStore`]: process-local history for tests and dry runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use super::record::AlertHistory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("alert store I/O on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("alert history '{path}' is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialize alert history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Load/save collaborator for the deduplicator.
pub trait AlertStore: Send + Sync {
    fn load(&self) -> Result<AlertHistory, StoreError>;
    fn save(&self, history: &AlertHistory) -> Result<(), StoreError>;
}

impl<S: AlertStore + ?Sized> AlertStore for &S {
    fn load(&self) -> Result<AlertHistory, StoreError> {
        (**self).load()
    }

    fn save(&self, history: &AlertHistory) -> Result<(), StoreError> {
        (**self).save(history)
    }
}

/// JSON file store.
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
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

impl AlertStore for JsonFileStore {
    fn load(&self) -> Result<AlertHistory, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(AlertHistory::new()),
            Err(e) => return Err(io_err(&self.path)(e)),
        };
        if content.trim().is_empty() {
            return Ok(AlertHistory::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes are atomic: write to .tmp then rename.
    fn save(&self, history: &AlertHistory) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let json = serde_json::to_string_pretty(history)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(io_err(&tmp_path))?;

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            // Clean up temp file on rename failure
            let _ = fs::remove_file(&tmp_path);
            io_err(&self.path)(e)
        })
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    history: Mutex<AlertHistory>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: AlertHistory) -> Self {
        Self {
            history: Mutex::new(history),
        }
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> AlertHistory {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl AlertStore for MemoryStore {
    fn load(&self) -> Result<AlertHistory, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, history: &AlertHistory) -> Result<(), StoreError> {
        *self.history.lock().unwrap_or_else(|e| e.into_inner()) = history.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample() -> AlertHistory {
        let mut history = AlertHistory::new();
        history.upsert("INFY", Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(), 8);
        history
    }

    #[test]
    fn missing_file_is_empty_history() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("none.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_in_new_instance() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/history.json");
        JsonFileStore::new(&path).save(&sample()).unwrap();

        let reloaded = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(reloaded, sample());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        // The corrupt file is left for the operator.
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn empty_file_is_empty_history() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");
        fs::write(&path, "\n").unwrap();
        assert!(JsonFileStore::new(&path).load().unwrap().is_empty());
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
    }
}
