// ABOUTME: Key-value persistence abstraction for step state and user preferences
// ABOUTME: Pluggable backends (in-memory, JSON file) with typed accessors and batched commits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

/// Backend selection from configuration
pub mod factory;
/// JSON-file backed store
pub mod file;
/// In-memory store
pub mod memory;
/// Mapping of `PersistedState` and `UserProfile` onto store keys
pub mod repository;

pub use factory::Store;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use repository::StateRepository;

use pedometer_core::errors::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A typed value held under one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum StoreValue {
    /// Floating point value
    Float(f64),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// Boolean flag
    Bool(bool),
    /// UTF-8 string
    String(String),
}

impl StoreValue {
    const fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
        }
    }
}

/// Keys written together in one commit
///
/// Keys that jointly define an epoch go into the same batch so a crash can
/// never leave a new anchor next to an old bucket total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    entries: Vec<(String, StoreValue)>,
}

impl WriteBatch {
    /// Empty batch
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Queue a value under `key`; a later put to the same key wins
    pub fn put(&mut self, key: impl Into<String>, value: StoreValue) -> &mut Self {
        self.entries.push((key.into(), value));
        self
    }

    /// Queue a float
    pub fn put_float(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.put(key, StoreValue::Float(value))
    }

    /// Queue an int
    pub fn put_int(&mut self, key: impl Into<String>, value: i32) -> &mut Self {
        self.put(key, StoreValue::Int(value))
    }

    /// Queue a long
    pub fn put_long(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.put(key, StoreValue::Long(value))
    }

    /// Queue a bool
    pub fn put_bool(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.put(key, StoreValue::Bool(value))
    }

    /// Queue a string
    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.put(key, StoreValue::String(value.into()))
    }

    /// Number of queued writes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for WriteBatch {
    type Item = (String, StoreValue);
    type IntoIter = std::vec::IntoIter<(String, StoreValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

fn type_mismatch(key: &str, expected: &str, found: &StoreValue) -> AppError {
    AppError::new(
        ErrorCode::SerializationError,
        format!(
            "key '{key}' holds a {} value, expected {expected}",
            found.type_name()
        ),
    )
}

/// Flat string-keyed store with typed accessors
///
/// Reads take a caller-supplied default for missing keys. There is no
/// enumeration or deletion; old bucket keys simply stay in the store.
pub trait KeyValueStore: Send + Sync {
    /// Raw value under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    fn get(&self, key: &str) -> AppResult<Option<StoreValue>>;

    /// Write every entry of `batch` together
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write; no entry is applied then
    fn commit(&self, batch: WriteBatch) -> AppResult<()>;

    /// Float under `key`, or `default`
    ///
    /// # Errors
    ///
    /// Returns an error on read failure or if the key holds another type
    fn get_float(&self, key: &str, default: f64) -> AppResult<f64> {
        match self.get(key)? {
            None => Ok(default),
            Some(StoreValue::Float(v)) => Ok(v),
            Some(other) => Err(type_mismatch(key, "float", &other)),
        }
    }

    /// Int under `key`, or `default`
    ///
    /// # Errors
    ///
    /// Returns an error on read failure or if the key holds another type
    fn get_int(&self, key: &str, default: i32) -> AppResult<i32> {
        match self.get(key)? {
            None => Ok(default),
            Some(StoreValue::Int(v)) => Ok(v),
            Some(other) => Err(type_mismatch(key, "int", &other)),
        }
    }

    /// Long under `key`, or `default`
    ///
    /// # Errors
    ///
    /// Returns an error on read failure or if the key holds another type
    fn get_long(&self, key: &str, default: i64) -> AppResult<i64> {
        match self.get(key)? {
            None => Ok(default),
            Some(StoreValue::Long(v)) => Ok(v),
            Some(other) => Err(type_mismatch(key, "long", &other)),
        }
    }

    /// Bool under `key`, or `default`
    ///
    /// # Errors
    ///
    /// Returns an error on read failure or if the key holds another type
    fn get_bool(&self, key: &str, default: bool) -> AppResult<bool> {
        match self.get(key)? {
            None => Ok(default),
            Some(StoreValue::Bool(v)) => Ok(v),
            Some(other) => Err(type_mismatch(key, "bool", &other)),
        }
    }

    /// String under `key`, or `default`
    ///
    /// # Errors
    ///
    /// Returns an error on read failure or if the key holds another type
    fn get_string(&self, key: &str, default: &str) -> AppResult<String> {
        match self.get(key)? {
            None => Ok(default.to_owned()),
            Some(StoreValue::String(v)) => Ok(v),
            Some(other) => Err(type_mismatch(key, "string", &other)),
        }
    }

    /// Write a single float
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write
    fn put_float(&self, key: &str, value: f64) -> AppResult<()> {
        let mut batch = WriteBatch::new();
        batch.put_float(key, value);
        self.commit(batch)
    }

    /// Write a single int
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write
    fn put_int(&self, key: &str, value: i32) -> AppResult<()> {
        let mut batch = WriteBatch::new();
        batch.put_int(key, value);
        self.commit(batch)
    }

    /// Write a single long
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write
    fn put_long(&self, key: &str, value: i64) -> AppResult<()> {
        let mut batch = WriteBatch::new();
        batch.put_long(key, value);
        self.commit(batch)
    }

    /// Write a single bool
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write
    fn put_bool(&self, key: &str, value: bool) -> AppResult<()> {
        let mut batch = WriteBatch::new();
        batch.put_bool(key, value);
        self.commit(batch)
    }

    /// Write a single string
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write
    fn put_string(&self, key: &str, value: &str) -> AppResult<()> {
        let mut batch = WriteBatch::new();
        batch.put_string(key, value);
        self.commit(batch)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> AppResult<Option<StoreValue>> {
        (**self).get(key)
    }

    fn commit(&self, batch: WriteBatch) -> AppResult<()> {
        (**self).commit(batch)
    }
}
