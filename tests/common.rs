// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, fixed timestamps, a store with injectable write faults, and session builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
//! Shared test utilities for `zen_pedometer`

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use zen_pedometer::accounting::StepAccountant;
use zen_pedometer::errors::{AppError, AppResult};
use zen_pedometer::sensor::SimulatedSensor;
use zen_pedometer::session::TrackingSession;
use zen_pedometer::storage::{KeyValueStore, MemoryStore, StateRepository, StoreValue, WriteBatch};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Local wall-clock time
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Float equality for step totals
pub fn assert_steps(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected} steps, got {actual}"
    );
}

/// In-memory store whose commits can be made to fail on demand
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following commit fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Entries actually persisted
    pub fn persisted(&self) -> &MemoryStore {
        &self.inner
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> AppResult<Option<StoreValue>> {
        self.inner.get(key)
    }

    fn commit(&self, batch: WriteBatch) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::storage("injected write failure"));
        }
        self.inner.commit(batch)
    }
}

/// Stopped session over `store` with the default accountant
pub fn session_with<S: KeyValueStore>(store: S, sensor: SimulatedSensor) -> TrackingSession<S> {
    init_test_logging();
    TrackingSession::new(
        StateRepository::new(store),
        StepAccountant::default(),
        Box::new(sensor),
    )
    .unwrap()
}
