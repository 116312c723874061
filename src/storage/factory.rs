// ABOUTME: Store factory for configuration-based backend selection
// ABOUTME: Wraps the in-memory and JSON-file backends behind one concrete type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

use super::{FileStore, KeyValueStore, MemoryStore, StoreValue, WriteBatch};
use crate::config::{StorageBackend, StorageConfig};
use pedometer_core::errors::AppResult;
use tracing::info;

/// Unified store interface over the available backends
#[derive(Debug)]
pub enum Store {
    /// Ephemeral in-memory preferences
    Memory(MemoryStore),
    /// JSON document on disk
    File(FileStore),
}

impl Store {
    /// Create the backend selected by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the file backend cannot open its document
    pub fn from_config(config: &StorageConfig) -> AppResult<Self> {
        match config.backend {
            StorageBackend::Memory => {
                info!("Initializing in-memory preference store");
                Ok(Self::Memory(MemoryStore::new()))
            }
            StorageBackend::File => {
                info!(path = %config.path.display(), "Initializing file preference store");
                Ok(Self::File(FileStore::open(&config.path)?))
            }
        }
    }
}

impl KeyValueStore for Store {
    fn get(&self, key: &str) -> AppResult<Option<StoreValue>> {
        match self {
            Self::Memory(store) => store.get(key),
            Self::File(store) => store.get(key),
        }
    }

    fn commit(&self, batch: WriteBatch) -> AppResult<()> {
        match self {
            Self::Memory(store) => store.commit(batch),
            Self::File(store) => store.commit(batch),
        }
    }
}
