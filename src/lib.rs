// ABOUTME: Main library entry point for the Zen Pedometer step tracker
// ABOUTME: Step accounting, tracking session lifecycle, persistence, and dashboard read model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

#![deny(unsafe_code)]

//! # Zen Pedometer
//!
//! Turns the cumulative readings of a hardware step counter into daily,
//! weekly, monthly, and yearly step totals plus walking time, and persists
//! them in a flat key-value store so they survive restarts and device reboots.
//!
//! ## Architecture
//!
//! - **Accounting**: [`accounting::StepAccountant`], pure snapshot-in/snapshot-out bookkeeping
//! - **Session**: [`session::TrackingSession`], sensor registration and flush-per-event
//! - **Service**: [`service::TrackingService`], one tokio task serializing events and commands
//! - **Storage**: [`storage::KeyValueStore`] with memory and JSON-file backends
//! - **Dashboard**: [`dashboard::DashboardSnapshot`] and derived metrics for presentation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zen_pedometer::clock::SystemClock;
//! use zen_pedometer::config::PedometerConfig;
//! use zen_pedometer::errors::AppResult;
//! use zen_pedometer::sensor::SimulatedSensor;
//! use zen_pedometer::service::TrackingService;
//! use zen_pedometer::session::TrackingSession;
//! use zen_pedometer::storage::{StateRepository, Store};
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = PedometerConfig::from_env();
//!     let store = Store::from_config(&config.storage)?;
//!     let session = TrackingSession::new(
//!         StateRepository::new(store),
//!         config.accounting.accountant(),
//!         Box::new(SimulatedSensor::new()),
//!     )?;
//!
//!     let handle = TrackingService::spawn(session, Arc::new(SystemClock), &config.service);
//!     handle.start().await?;
//!     println!("{:?}", handle.snapshot().displayed_steps);
//!     handle.shutdown().await
//! }
//! ```

/// Step accounting over persisted state snapshots
pub mod accounting;

/// Calendar bucket keys and wall-clock helpers
pub mod calendar;

/// Wall-clock sources
pub mod clock;

/// Environment configuration
pub mod config;

/// Storage keys, limits, and unit constants
pub mod constants;

/// Dashboard snapshot, derived metrics, and text rendering
pub mod dashboard;

/// Error types
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Persisted state and profile models
pub mod models;

/// Replay of recorded sensor readings
pub mod replay;

/// Step counter sensor abstraction and simulator
pub mod sensor;

/// Background tracking service and its handle
pub mod service;

/// Tracking session lifecycle
pub mod session;

/// Key-value persistence
pub mod storage;
