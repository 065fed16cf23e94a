//! Persistence for the auth record.
//!
//! One named slot holding the serialized [`AuthRecord`] behind a small
//! repository trait, so the medium is swappable: a JSON file for real
//! deployments, plain memory for tests. The gateway loads the record at
//! the start of every outbound request and writes it back only when the
//! organization gets resolved or an explicit mutation runs.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::types::AuthRecord;

/// Name of the storage slot. Matches the web client's localStorage key so
/// the two record formats stay interchangeable.
pub const STORAGE_SLOT: &str = "auth-storage";

/// Repository for the persisted auth record.
///
/// `load` runs on every request, so implementations must be cheap to call.
pub trait AuthStore: Send + Sync {
    /// Read the record. A missing slot is `Ok(None)`: an anonymous client.
    fn load(&self) -> Result<Option<AuthRecord>, StoreError>;

    /// Replace the record.
    fn save(&self, record: &AuthRecord) -> Result<(), StoreError>;

    /// Destroy the slot entirely. Idempotent.
    fn clear(&self) -> Result<(), StoreError>;
}

/// On-disk envelope. The record rides under a `state` key, matching the
/// slot format the web client persists.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    state: AuthRecord,
}

/// File-backed store: the slot lives as `auth-storage.json` inside a
/// directory of the caller's choosing.
pub struct FileAuthStore {
    path: PathBuf,
}

impl FileAuthStore {
    /// Keep the slot under `dir`, using the fixed slot name.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_SLOT}.json")),
        }
    }

    /// Use an explicit slot file instead of the default name under a
    /// directory.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Full path of the slot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuthStore for FileAuthStore {
    fn load(&self) -> Result<Option<AuthRecord>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let persisted: PersistedState = serde_json::from_str(&raw)?;
        Ok(Some(persisted.state))
    }

    fn save(&self, record: &AuthRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let persisted = PersistedState {
            state: record.clone(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&persisted)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and short-lived tools.
#[derive(Default)]
pub struct MemoryAuthStore {
    record: RwLock<Option<AuthRecord>>,
}

impl MemoryAuthStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start pre-populated, e.g. with an already signed-in session.
    pub fn with_record(record: AuthRecord) -> Self {
        Self {
            record: RwLock::new(Some(record)),
        }
    }
}

impl AuthStore for MemoryAuthStore {
    fn load(&self) -> Result<Option<AuthRecord>, StoreError> {
        Ok(self.record.read().unwrap().clone())
    }

    fn save(&self, record: &AuthRecord) -> Result<(), StoreError> {
        *self.record.write().unwrap() = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.record.write().unwrap() = None;
        Ok(())
    }
}
