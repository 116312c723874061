// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for storage keys, profile limits, metrics, and units
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

//! Constants module
//!
//! Constants are grouped by domain rather than kept in a single list.

/// Key names used in the key-value preference store
pub mod keys;
/// Unit conversion and measurement constants
pub mod units;

/// Sensor feed constants
pub mod sensor {
    /// Sentinel reading meaning "sensor unavailable or permission denied"
    pub const UNAVAILABLE_READING: f64 = -1.0;

    /// Default drop (in steps) below the previous reading treated as a device reboot
    pub const DEFAULT_REBOOT_DROP_THRESHOLD: f64 = 100.0;
}

/// User profile limits and defaults
pub mod profile {
    /// Minimum accepted daily step goal
    pub const STEP_GOAL_MIN: u32 = 1_000;
    /// Maximum accepted daily step goal
    pub const STEP_GOAL_MAX: u32 = 50_000;
    /// Default daily step goal
    pub const DEFAULT_STEP_GOAL: u32 = 10_000;

    /// Minimum accepted body weight (kg)
    pub const WEIGHT_KG_MIN: f64 = 30.0;
    /// Maximum accepted body weight (kg)
    pub const WEIGHT_KG_MAX: f64 = 150.0;
    /// Default body weight (kg)
    pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

    /// Minimum accepted height (cm)
    pub const HEIGHT_CM_MIN: f64 = 100.0;
    /// Maximum accepted height (cm)
    pub const HEIGHT_CM_MAX: f64 = 250.0;
    /// Default height (cm)
    pub const DEFAULT_HEIGHT_CM: f64 = 170.0;
}

/// Walking metric estimation factors
pub mod metrics {
    /// Step length as a fraction of body height
    pub const STEP_LENGTH_HEIGHT_RATIO: f64 = 0.415;
    /// Walking energy cost in kcal per kg of body weight per km
    pub const KCAL_PER_KG_KM: f64 = 0.57;
}

/// Storage backend defaults
pub mod storage {
    /// Default preference file name for the file-backed store
    pub const DEFAULT_STORE_PATH: &str = "zen_pedometer_prefs.json";
}

/// Tracking service defaults
pub mod service {
    /// Service name used in structured logs
    pub const SERVICE_NAME: &str = "zen-pedometer";
    /// Default capacity of the sensor event and command queues
    pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 64;
}
