// ABOUTME: Core types and constants for the Zen Pedometer step tracker
// ABOUTME: Foundation crate with error handling, constants, and persisted data models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

#![deny(unsafe_code)]

//! # Pedometer Core
//!
//! Foundation crate providing shared types and constants for the Zen Pedometer
//! step tracker. It holds no I/O and changes infrequently, so the root crate can
//! build on it without recompiling the data model.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Storage keys, profile limits, metric factors, and units
//! - **models**: `PersistedState`, `UserProfile`, and calendar bucket types

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (persisted step state, user profile, buckets)
pub mod models;
