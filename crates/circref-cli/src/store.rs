//! File-backed [`FilterStore`]: a JSON object of string keys to string
//! values, rewritten whole on every change.
//!
//! A missing file reads as an empty store. A file that exists but is not a
//! JSON object of strings is an error; the record inside it is only
//! validated later, by the filter engine.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use circref_core::{FilterStore, StoreError};

/// Persists entries in a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store over `path`. Nothing is read or created until the
    /// first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.error(&e)),
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(|e| self.error(&e))
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(entries).map_err(|e| self.error(&e))?;
        std::fs::write(&self.path, text + "\n").map_err(|e| self.error(&e))
    }

    fn error(&self, e: &dyn std::fmt::Display) -> StoreError {
        StoreError::new(format!("{}: {e}", self.path.display()))
    }
}

impl FilterStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.write_entries(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(self.error(&e)),
            };
        }
        self.write_entries(&entries)
    }
}
