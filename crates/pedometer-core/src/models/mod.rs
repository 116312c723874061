// ABOUTME: Core data models for step accounting and user profile settings
// ABOUTME: Re-exports PersistedState, bucket types, calendar periods, and UserProfile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

//! Data models shared by the accounting engine, storage mapping, and dashboard.

/// Calendar period granularities and bucket keys
pub mod period;
/// User profile (goal, weight, height) with range validation
pub mod profile;
/// Persisted step-accounting state
pub mod state;

pub use period::{BucketKeys, Period};
pub use profile::UserProfile;
pub use state::{BucketTotal, PersistedState, StepBuckets};
