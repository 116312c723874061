// ABOUTME: Persisted step-accounting state: epoch anchor, raw readings, buckets, walking time
// ABOUTME: Snapshot record passed into and returned from the step accountant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

use super::period::Period;
use crate::constants::sensor::UNAVAILABLE_READING;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Running total for the live bucket of one period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketTotal {
    /// Calendar bucket key; empty until the first rollover
    pub key: String,
    /// Steps counted in this bucket
    pub total: f64,
}

impl BucketTotal {
    /// Bucket starting at zero for `key`
    #[must_use]
    pub fn fresh(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            total: 0.0,
        }
    }
}

/// The live bucket of every period
///
/// Only the current key of each period is held in memory; totals for older
/// keys stay in the store untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepBuckets {
    /// Today's bucket
    pub daily: BucketTotal,
    /// This ISO week's bucket
    pub weekly: BucketTotal,
    /// This month's bucket
    pub monthly: BucketTotal,
    /// This year's bucket
    pub yearly: BucketTotal,
}

impl StepBuckets {
    /// Bucket for `period`
    #[must_use]
    pub const fn get(&self, period: Period) -> &BucketTotal {
        match period {
            Period::Daily => &self.daily,
            Period::Weekly => &self.weekly,
            Period::Monthly => &self.monthly,
            Period::Yearly => &self.yearly,
        }
    }

    /// Mutable bucket for `period`
    pub fn get_mut(&mut self, period: Period) -> &mut BucketTotal {
        match period {
            Period::Daily => &mut self.daily,
            Period::Weekly => &mut self.weekly,
            Period::Monthly => &mut self.monthly,
            Period::Yearly => &mut self.yearly,
        }
    }
}

/// Logical schema of the key-value store
///
/// Timestamps are local wall-clock times; bucket keys are derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Absolute reading at the start of the current epoch, `None` until the first event
    pub initial_step_count: Option<f64>,
    /// Most recent absolute reading, or `-1` when the sensor is unavailable
    pub current_step_count: f64,
    /// Absolute reading at the last flush
    pub previous_step_count: f64,
    /// Steps counted in this epoch before a detected device reboot
    pub epoch_carried_steps: f64,
    /// Start of the current epoch (daily rollover or manual reset)
    pub last_reset_time: Option<NaiveDateTime>,
    /// Start of the current contiguous walking session
    pub walking_start_time: Option<NaiveDateTime>,
    /// Whether a walking session is open; process-local, never persisted
    #[serde(skip)]
    pub is_walking: bool,
    /// Walking time accumulated in the current epoch, in milliseconds
    pub total_walking_time_ms: i64,
    /// Live bucket totals
    pub buckets: StepBuckets,
    /// Whether the hardware step counter exists
    pub is_sensor_available: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            initial_step_count: None,
            current_step_count: 0.0,
            previous_step_count: 0.0,
            epoch_carried_steps: 0.0,
            last_reset_time: None,
            walking_start_time: None,
            is_walking: false,
            total_walking_time_ms: 0,
            buckets: StepBuckets::default(),
            is_sensor_available: true,
        }
    }
}

impl PersistedState {
    /// Whether the last reading signalled "unavailable / permission denied"
    #[must_use]
    pub fn reading_unavailable(&self) -> bool {
        self.current_step_count <= UNAVAILABLE_READING
    }

    /// Steps since the current epoch began, or `None` when there is no data
    ///
    /// Clamped at zero so a stale anchor never renders a negative count.
    #[must_use]
    pub fn displayed_steps(&self) -> Option<f64> {
        if !self.is_sensor_available || self.reading_unavailable() {
            return None;
        }
        let initial = self.initial_step_count?;
        Some((self.epoch_carried_steps + self.current_step_count - initial).max(0.0))
    }

    /// Total for the live bucket of `period`
    #[must_use]
    pub const fn bucket_total(&self, period: Period) -> f64 {
        self.buckets.get(period).total
    }
}
