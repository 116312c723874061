// ABOUTME: Configuration module for storage, step accounting, and the tracking service
// ABOUTME: Environment-driven settings with typed defaults and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

/// Environment-based configuration
pub mod environment;

pub use environment::{
    AccountingConfig, PedometerConfig, ServiceConfig, StorageBackend, StorageConfig,
};
