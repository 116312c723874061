// ABOUTME: In-memory key-value store for tests and ephemeral tracking runs
// ABOUTME: Shares one map behind an RwLock so clones observe the same preferences
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

use super::{KeyValueStore, StoreValue, WriteBatch};
use pedometer_core::errors::AppResult;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// In-memory preference store
///
/// Cloning is cheap and every clone shares the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoreValue>>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<StoreValue>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn commit(&self, batch: WriteBatch) -> AppResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.extend(batch);
        Ok(())
    }
}
