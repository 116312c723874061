// ABOUTME: Step accountant turning absolute step-counter readings into period-bucketed totals
// ABOUTME: Handles epoch anchoring, calendar rollover, reboot drops, walking time, and manual reset
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

//! # Step Accounting
//!
//! The hardware counter reports a cumulative number of steps since boot. The
//! [`StepAccountant`] converts each reading into:
//!
//! - a daily total, set to the displacement from the epoch anchor
//!   (`initial_step_count`) plus any steps carried over a reboot,
//! - weekly, monthly, and yearly totals, accumulated from positive deltas
//!   against the previous reading,
//! - walking time, extended by the gap between consecutive events.
//!
//! Every operation takes a snapshot and returns a new one. No I/O happens
//! here; the tracking session persists the result. Rollover logic lives only
//! in this module so every caller applies the same epoch rules.

use crate::calendar::{bucket_keys, day_key, elapsed_ms, is_later_key, start_of_day};
use chrono::NaiveDateTime;
use pedometer_core::constants::sensor::{DEFAULT_REBOOT_DROP_THRESHOLD, UNAVAILABLE_READING};
use pedometer_core::models::{BucketTotal, PersistedState, Period};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// How a large backwards jump of the hardware counter is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebootPolicy {
    /// Assume the device rebooted: keep the epoch's steps and count from zero again
    #[default]
    ReAnchor,
    /// Treat every drop as noise; totals stall until the counter catches up
    Ignore,
}

impl RebootPolicy {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "ignore" | "noise" => Self::Ignore,
            _ => Self::ReAnchor,
        }
    }
}

impl fmt::Display for RebootPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReAnchor => write!(f, "reanchor"),
            Self::Ignore => write!(f, "ignore"),
        }
    }
}

/// Pure bookkeeping over [`PersistedState`] snapshots
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepAccountant {
    reboot_policy: RebootPolicy,
    reboot_drop_threshold: f64,
}

impl Default for StepAccountant {
    fn default() -> Self {
        Self::new(RebootPolicy::default(), DEFAULT_REBOOT_DROP_THRESHOLD)
    }
}

impl StepAccountant {
    /// Create an accountant with the given reboot handling
    #[must_use]
    pub const fn new(reboot_policy: RebootPolicy, reboot_drop_threshold: f64) -> Self {
        Self {
            reboot_policy,
            reboot_drop_threshold,
        }
    }

    /// Configured reboot policy
    #[must_use]
    pub const fn reboot_policy(&self) -> RebootPolicy {
        self.reboot_policy
    }

    /// Apply one absolute sensor reading observed at `now`
    ///
    /// A negative or non-finite reading (the `-1` sentinel) only marks the
    /// reading as unavailable; no bucket or anchor changes. Re-delivering the
    /// same `(reading, now)` produces an identical snapshot.
    #[must_use]
    pub fn observe(
        &self,
        reading: f64,
        now: NaiveDateTime,
        state: &PersistedState,
    ) -> PersistedState {
        let mut next = state.clone();

        if !reading.is_finite() || reading < 0.0 {
            debug!(reading, "Sensor reading unavailable, skipping step accounting");
            next.current_step_count = UNAVAILABLE_READING;
            return next;
        }

        if next.initial_step_count.is_none() {
            next.initial_step_count = Some(reading);
            next.previous_step_count = reading;
            next.epoch_carried_steps = 0.0;
            info!(reading, "Epoch anchored at first sensor reading");
        }

        Self::apply_rollover(&mut next, now);
        self.apply_reading(&mut next, reading);
        Self::extend_walking(&mut next, now);
        next
    }

    /// Start fresh buckets for every period whose calendar key changed at `now`
    ///
    /// Run at session start so figures are current before the first step event.
    #[must_use]
    pub fn roll_over(&self, now: NaiveDateTime, state: &PersistedState) -> PersistedState {
        let mut next = state.clone();
        Self::apply_rollover(&mut next, now);
        next
    }

    /// Close the open walking session, folding its last interval into the total
    #[must_use]
    pub fn close_session(&self, now: NaiveDateTime, state: &PersistedState) -> PersistedState {
        let mut next = state.clone();
        if next.is_walking {
            if let Some(start) = next.walking_start_time {
                next.total_walking_time_ms += elapsed_ms(&start, &now);
            }
            next.is_walking = false;
            debug!(
                total_walking_time_ms = next.total_walking_time_ms,
                "Walking session closed"
            );
        }
        next
    }

    /// User-initiated reset of displayed steps
    ///
    /// Re-anchors the epoch at the latest valid reading, clears walking time,
    /// and zeroes the daily bucket. Weekly, monthly, and yearly totals and the
    /// raw reading are left alone.
    #[must_use]
    pub fn reset(&self, now: NaiveDateTime, state: &PersistedState) -> PersistedState {
        let mut next = state.clone();
        let anchor = if next.reading_unavailable() {
            next.previous_step_count
        } else {
            next.current_step_count
        };

        if next.initial_step_count.is_some() {
            next.initial_step_count = Some(anchor);
            next.previous_step_count = anchor;
        }
        next.epoch_carried_steps = 0.0;
        next.last_reset_time = Some(now);
        next.total_walking_time_ms = 0;
        next.is_walking = false;
        next.walking_start_time = None;
        let today = day_key(&now);
        if is_later_key(&today, &next.buckets.daily.key) {
            next.buckets.daily = BucketTotal::fresh(today);
        } else {
            // same day, or a clock behind it: zero the live bucket in place
            next.buckets.daily.total = 0.0;
        }

        info!(anchor, day = %next.buckets.daily.key, "Steps reset by user");
        next
    }

    /// Buckets only move forward: a late event or a clock set back keeps the
    /// live buckets and counts toward them.
    fn apply_rollover(state: &mut PersistedState, now: NaiveDateTime) {
        let keys = bucket_keys(&now);

        if is_later_key(&keys.day, &state.buckets.daily.key) {
            // The last valid reading closes the old day, so steps taken between
            // it and this event count toward the new day.
            if state.initial_step_count.is_some() {
                state.initial_step_count = Some(state.previous_step_count);
            }
            state.epoch_carried_steps = 0.0;
            state.total_walking_time_ms = 0;
            state.last_reset_time = Some(now);
            if state.is_walking {
                let midnight = start_of_day(&now);
                state.walking_start_time = state
                    .walking_start_time
                    .map(|start| start.max(midnight));
            }
            info!(
                previous = %state.buckets.daily.key,
                current = %keys.day,
                "Daily rollover, new epoch started"
            );
            state.buckets.daily = BucketTotal::fresh(keys.day.clone());
        }

        for period in [Period::Weekly, Period::Monthly, Period::Yearly] {
            let key = keys.get(period);
            let bucket = state.buckets.get_mut(period);
            if is_later_key(&key, &bucket.key) {
                info!(%period, previous = %bucket.key, current = %key, "Bucket rollover");
                *bucket = BucketTotal::fresh(key);
            }
        }
    }

    fn apply_reading(&self, state: &mut PersistedState, reading: f64) {
        let previous = state.previous_step_count;
        let mut contribution = reading - previous;

        if contribution < 0.0 {
            let drop = -contribution;
            if self.reboot_policy == RebootPolicy::ReAnchor && drop >= self.reboot_drop_threshold {
                // The counter restarts from zero at boot, so `reading` steps were
                // taken since then. Carry what the epoch had already counted.
                let initial = state.initial_step_count.unwrap_or(previous);
                state.epoch_carried_steps += (previous - initial).max(0.0);
                state.initial_step_count = Some(0.0);
                contribution = reading;
                warn!(
                    previous,
                    reading,
                    carried = state.epoch_carried_steps,
                    "Step counter dropped, assuming device reboot"
                );
            } else {
                debug!(previous, reading, "Non-increasing reading ignored");
                contribution = 0.0;
            }
        }

        if contribution > 0.0 {
            for period in [Period::Weekly, Period::Monthly, Period::Yearly] {
                state.buckets.get_mut(period).total += contribution;
            }
        }

        if let Some(initial) = state.initial_step_count {
            let displacement = state.epoch_carried_steps + reading - initial;
            let daily = &mut state.buckets.daily;
            daily.total = daily.total.max(displacement);
        }

        state.previous_step_count = reading;
        state.current_step_count = reading;

        debug!(
            reading,
            contribution,
            daily = state.buckets.daily.total,
            weekly = state.buckets.weekly.total,
            "Step reading applied"
        );
    }

    fn extend_walking(state: &mut PersistedState, now: NaiveDateTime) {
        if state.is_walking {
            if let Some(start) = state.walking_start_time {
                state.total_walking_time_ms += elapsed_ms(&start, &now);
            }
            // a late event neither moves the session start backwards nor adds time
            state.walking_start_time =
                Some(state.walking_start_time.map_or(now, |start| start.max(now)));
        } else {
            state.is_walking = true;
            state.walking_start_time = Some(now);
            debug!(%now, "Walking session opened");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_first_reading_anchors_epoch() {
        let accountant = StepAccountant::default();
        let state = accountant.observe(500.0, day(14), &PersistedState::default());

        assert_eq!(state.initial_step_count, Some(500.0));
        assert!(state.buckets.daily.total.abs() < f64::EPSILON);
        assert!(state.buckets.weekly.total.abs() < f64::EPSILON);
        assert_eq!(state.buckets.daily.key, "20250114");
        assert!(state.is_walking);
    }

    #[test]
    fn test_walking_time_heartbeat() {
        let accountant = StepAccountant::default();
        let t0 = day(14);
        let state = accountant.observe(10.0, t0, &PersistedState::default());
        let state = accountant.observe(20.0, t0 + TimeDelta::seconds(30), &state);
        let state = accountant.observe(30.0, t0 + TimeDelta::seconds(45), &state);
        assert_eq!(state.total_walking_time_ms, 45_000);

        let closed = accountant.close_session(t0 + TimeDelta::seconds(50), &state);
        assert_eq!(closed.total_walking_time_ms, 50_000);
        assert!(!closed.is_walking);

        // closing twice adds nothing
        let again = accountant.close_session(t0 + TimeDelta::seconds(90), &closed);
        assert_eq!(again.total_walking_time_ms, 50_000);
    }

    #[test]
    fn test_startup_rollover_keeps_unanchored_state_unanchored() {
        let accountant = StepAccountant::default();
        let state = accountant.roll_over(day(14), &PersistedState::default());
        assert_eq!(state.initial_step_count, None);
        assert_eq!(state.buckets.daily.key, "20250114");
        assert_eq!(state.buckets.weekly.key, "2025W03");
    }

    #[test]
    fn test_midnight_clamps_open_walking_session() {
        let accountant = StepAccountant::default();
        let before = NaiveDate::from_ymd_opt(2025, 1, 14)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        let after = before + TimeDelta::minutes(2);

        let state = accountant.observe(100.0, before, &PersistedState::default());
        let state = accountant.observe(150.0, after, &state);

        // only the minute after midnight belongs to the new day
        assert_eq!(state.total_walking_time_ms, 60_000);
        assert!((state.buckets.daily.total - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_late_event_keeps_walking_time_within_span() {
        let accountant = StepAccountant::default();
        let t0 = day(14);
        let state = accountant.observe(10.0, t0, &PersistedState::default());
        let state = accountant.observe(20.0, t0 + TimeDelta::minutes(10), &state);
        let state = accountant.observe(15.0, t0 + TimeDelta::minutes(5), &state);
        assert_eq!(state.walking_start_time, Some(t0 + TimeDelta::minutes(10)));

        let state = accountant.observe(30.0, t0 + TimeDelta::minutes(15), &state);
        assert_eq!(state.total_walking_time_ms, 15 * 60_000);
    }

    #[test]
    fn test_reboot_policy_parsing() {
        assert_eq!(RebootPolicy::from_str_or_default("IGNORE"), RebootPolicy::Ignore);
        assert_eq!(RebootPolicy::from_str_or_default("reanchor"), RebootPolicy::ReAnchor);
        assert_eq!(RebootPolicy::from_str_or_default("bogus"), RebootPolicy::ReAnchor);
        assert_eq!(RebootPolicy::Ignore.to_string(), "ignore");
    }
}
