// ABOUTME: JSON-file key-value store persisting preferences across process restarts
// ABOUTME: Each commit rewrites the document through a temporary file and an atomic rename
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

use super::{KeyValueStore, StoreValue, WriteBatch};
use pedometer_core::errors::{AppError, AppResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

/// Preference store backed by a single JSON document
///
/// The document is read once at open and kept in memory. A commit only
/// becomes visible after the new document has been renamed into place, so a
/// failed write leaves both disk and memory at the previous version.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, StoreValue>>,
}

impl FileStore {
    /// Open the store at `path`, starting empty when the file does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(AppError::storage(format!(
                    "failed to read preferences at {}",
                    path.display()
                ))
                .with_source(e))
            }
        };
        info!(
            path = %path.display(),
            keys = entries.len(),
            "Opened preference file"
        );
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_document(&self, entries: &BTreeMap<String, StoreValue>) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> AppResult<Option<StoreValue>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn commit(&self, batch: WriteBatch) -> AppResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut updated = entries.clone();
        let written = batch.len();
        updated.extend(batch);
        self.write_document(&updated)?;
        *entries = updated;
        debug!(keys = written, path = %self.path.display(), "Preferences committed");
        Ok(())
    }
}
