//! Durable usage counter.
//!
//! The counter records how many news searches have been completed. It is
//! loaded once at startup and persisted synchronously after every increment.
//! Durability is best effort: storage errors are logged and the in-memory
//! count keeps advancing for the session.
//!
//! # Storage
//!
//! The value lives in a single string-keyed record:
//!
//! ```text
//! { "newsbyte/ai-chatbot-global-usage": "42" }
//! ```
//!
//! [`FileUsageStore`] keeps that object in a JSON file under the user's data
//! directory; [`MemoryUsageStore`] keeps it in memory for tests and
//! `--ephemeral` runs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Namespace half of the record key.
pub const USAGE_NAMESPACE: &str = "newsbyte";
/// Key half of the record key.
pub const USAGE_KEY: &str = "ai-chatbot-global-usage";

/// Errors raised by a [`UsageStore`].
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("usage store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("usage store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("usage store lock poisoned")]
    Poisoned,
}

/// A string-keyed durable record store.
pub trait UsageStore {
    /// Read the raw value under `key`, `None` if absent.
    fn read(&self, key: &str) -> Result<Option<String>, UsageError>;

    /// Replace the value under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), UsageError>;
}

/// Full record key for the usage count.
pub fn record_key() -> String {
    format!("{USAGE_NAMESPACE}/{USAGE_KEY}")
}

/// Stores records as a JSON object in one file.
#[derive(Debug, Clone)]
pub struct FileUsageStore {
    path: PathBuf,
}

impl FileUsageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_dir>/newsbyte/usage.json`, or `None` when the platform has no
    /// data directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join(USAGE_NAMESPACE).join("usage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, UsageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl UsageStore for FileUsageStore {
    fn read(&self, key: &str) -> Result<Option<String>, UsageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), UsageError> {
        // A corrupt file is replaced; an unreadable one is left alone.
        let mut records = match self.read_all() {
            Ok(records) => records,
            Err(UsageError::Json(e)) => {
                warn!(path = %self.path.display(), error = %e, "Replacing corrupt usage file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        records.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&records)?)?;
        Ok(())
    }
}

/// Keeps records in memory only.
#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    records: Mutex<BTreeMap<String, String>>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UsageStore for MemoryUsageStore {
    fn read(&self, key: &str) -> Result<Option<String>, UsageError> {
        let records = self.records.lock().map_err(|_| UsageError::Poisoned)?;
        Ok(records.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), UsageError> {
        let mut records = self.records.lock().map_err(|_| UsageError::Poisoned)?;
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<T: UsageStore + ?Sized> UsageStore for Box<T> {
    fn read(&self, key: &str) -> Result<Option<String>, UsageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), UsageError> {
        (**self).write(key, value)
    }
}

/// The usage count and the store it is persisted to.
#[derive(Debug)]
pub struct UsageCounter<S> {
    store: S,
    key: String,
    count: u64,
}

impl<S: UsageStore> UsageCounter<S> {
    /// Read the last persisted count.
    ///
    /// An absent, unreadable or unparsable record yields 0.
    #[instrument(level = "debug", skip_all)]
    pub fn load(store: S) -> Self {
        let key = record_key();
        let count = match store.read(&key) {
            Ok(Some(raw)) => raw.trim().parse::<u64>().unwrap_or_else(|e| {
                warn!(%raw, error = %e, "Stored usage count is not a number; starting from 0");
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                warn!(error = %e, "Failed to read usage count; starting from 0");
                0
            }
        };
        debug!(count, "Loaded usage count");
        Self { store, key, count }
    }

    /// Current in-memory count.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Add one, persist, and return the new count.
    ///
    /// Persistence errors are logged and otherwise ignored.
    pub fn increment(&mut self) -> u64 {
        self.count = self.count.saturating_add(1);
        if let Err(e) = self.store.write(&self.key, &self.count.to_string()) {
            warn!(error = %e, count = self.count, "Failed to persist usage count");
        }
        debug!(count = self.count, "Usage count incremented");
        self.count
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }
}
