// ABOUTME: Unit conversion constants for distance and time
// ABOUTME: Provides named constants to eliminate magic numbers in metric calculations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

/// Meters per kilometer conversion factor
pub const METERS_PER_KM: f64 = 1000.0;

/// Centimeters per meter conversion factor
pub const CM_PER_METER: f64 = 100.0;

/// Milliseconds per minute
pub const MS_PER_MINUTE: i64 = 60_000;

/// Percent scale
pub const PERCENT: f64 = 100.0;
