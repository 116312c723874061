// ABOUTME: Presentation snapshot of the tracking state with derived distance, calories, and progress
// ABOUTME: Renders dashboard lines that show N/A instead of numbers when step data is unavailable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

//! Dashboard read model
//!
//! [`DashboardSnapshot`] is what the presentation layer reads. Every step
//! figure is an `Option`: `None` means "no data" (missing sensor, denied
//! permission, or no reading yet) and is rendered as `N/A`, never as zero.

use crate::session::SessionState;
use pedometer_core::constants::metrics::{KCAL_PER_KG_KM, STEP_LENGTH_HEIGHT_RATIO};
use pedometer_core::constants::units::{CM_PER_METER, METERS_PER_KM, MS_PER_MINUTE, PERCENT};
use pedometer_core::models::{PersistedState, Period, UserProfile};
use serde::{Deserialize, Serialize};
use std::fmt;

const NOT_AVAILABLE: &str = "N/A";

/// Current figures for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Lifecycle state of the tracking session
    pub tracking: SessionState,
    /// Steps since the epoch anchor
    pub displayed_steps: Option<u64>,
    /// Daily step goal
    pub step_goal: u32,
    /// Body weight in kilograms
    pub weight_kg: f64,
    /// Body height in centimeters
    pub height_cm: f64,
    /// Total of the current day bucket
    pub daily_steps: Option<u64>,
    /// Total of the current ISO week bucket
    pub weekly_steps: Option<u64>,
    /// Total of the current month bucket
    pub monthly_steps: Option<u64>,
    /// Total of the current year bucket
    pub yearly_steps: Option<u64>,
    /// Accumulated walking time today
    pub total_walking_time_ms: Option<i64>,
    /// Whether the device has a step counter
    pub is_sensor_available: bool,
}

impl DashboardSnapshot {
    /// Build a snapshot from the accounting state and profile
    #[must_use]
    pub fn capture(state: &PersistedState, profile: &UserProfile, tracking: SessionState) -> Self {
        let has_data = state.is_sensor_available && !state.reading_unavailable();
        let bucket = |period: Period| has_data.then(|| to_count(state.bucket_total(period)));

        Self {
            tracking,
            displayed_steps: state.displayed_steps().map(to_count),
            step_goal: profile.step_goal,
            weight_kg: profile.weight_kg,
            height_cm: profile.height_cm,
            daily_steps: bucket(Period::Daily),
            weekly_steps: bucket(Period::Weekly),
            monthly_steps: bucket(Period::Monthly),
            yearly_steps: bucket(Period::Yearly),
            total_walking_time_ms: has_data.then_some(state.total_walking_time_ms),
            is_sensor_available: state.is_sensor_available,
        }
    }

    /// Distance, calories, progress, and walking minutes for this snapshot
    #[must_use]
    pub fn metrics(&self) -> DerivedMetrics {
        DerivedMetrics::compute(self)
    }
}

fn to_count(steps: f64) -> u64 {
    if steps.is_finite() && steps > 0.0 {
        steps.round() as u64
    } else {
        0
    }
}

/// Figures derived from displayed steps and the user profile
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Walked distance in kilometers
    pub distance_km: Option<f64>,
    /// Energy burned in kilocalories
    pub calories_kcal: Option<f64>,
    /// Goal progress clamped to `0.0..=1.0`
    pub progress_fraction: Option<f64>,
    /// Goal progress in percent, not clamped
    pub progress_percent: Option<f64>,
    /// Whole minutes of walking today
    pub walking_minutes: Option<i64>,
}

impl DerivedMetrics {
    /// Compute every metric, leaving each `None` when its inputs are unavailable
    #[must_use]
    pub fn compute(snapshot: &DashboardSnapshot) -> Self {
        let Some(steps) = snapshot
            .displayed_steps
            .filter(|_| snapshot.is_sensor_available)
        else {
            return Self::default();
        };
        let steps = steps as f64;
        let distance_km = distance_km(steps, snapshot.height_cm);

        Self {
            distance_km: Some(distance_km),
            calories_kcal: Some(calories_kcal(distance_km, snapshot.weight_kg)),
            progress_fraction: progress_fraction(steps, snapshot.step_goal),
            progress_percent: progress_percent(steps, snapshot.step_goal),
            walking_minutes: snapshot
                .total_walking_time_ms
                .map(|ms| ms.max(0) / MS_PER_MINUTE),
        }
    }
}

/// Stride length in meters estimated from body height
#[must_use]
pub fn step_length_m(height_cm: f64) -> f64 {
    height_cm * STEP_LENGTH_HEIGHT_RATIO / CM_PER_METER
}

/// Distance covered by `steps` in kilometers
#[must_use]
pub fn distance_km(steps: f64, height_cm: f64) -> f64 {
    steps * step_length_m(height_cm) / METERS_PER_KM
}

/// Walking energy expenditure in kilocalories
#[must_use]
pub fn calories_kcal(distance_km: f64, weight_kg: f64) -> f64 {
    distance_km * weight_kg * KCAL_PER_KG_KM
}

/// Goal progress clamped to one, `None` for a zero goal
#[must_use]
pub fn progress_fraction(steps: f64, goal: u32) -> Option<f64> {
    (goal > 0).then(|| (steps / f64::from(goal)).min(1.0))
}

/// Goal progress in percent, `None` for a zero goal
#[must_use]
pub fn progress_percent(steps: f64, goal: u32) -> Option<f64> {
    (goal > 0).then(|| steps / f64::from(goal) * PERCENT)
}

/// Text lines of the dashboard screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    lines: Vec<(&'static str, String)>,
}

impl DashboardView {
    /// Format a snapshot, grouping thousands with `.`
    #[must_use]
    pub fn render(snapshot: &DashboardSnapshot) -> Self {
        let metrics = snapshot.metrics();
        let steps = |value: Option<u64>| value.map_or_else(na, |n| format!("{} steps", group_thousands(n)));

        let lines = vec![
            (
                "Steps",
                snapshot.displayed_steps.map_or_else(na, |n| {
                    format!(
                        "{} / {}",
                        group_thousands(n),
                        group_thousands(u64::from(snapshot.step_goal))
                    )
                }),
            ),
            (
                "Progress",
                metrics
                    .progress_percent
                    .map_or_else(na, |p| format!("{p:.0}%")),
            ),
            (
                "Distance",
                metrics.distance_km.map_or_else(na, |km| format!("{km:.2} km")),
            ),
            (
                "Calories",
                metrics
                    .calories_kcal
                    .map_or_else(na, |kcal| format!("{kcal:.0} kcal")),
            ),
            (
                "Walking Time",
                metrics
                    .walking_minutes
                    .map_or_else(na, |minutes| format!("{minutes} min")),
            ),
            ("Today", steps(snapshot.daily_steps)),
            ("This Week", steps(snapshot.weekly_steps)),
            ("This Month", steps(snapshot.monthly_steps)),
            ("This Year", steps(snapshot.yearly_steps)),
        ];
        Self { lines }
    }

    /// Value shown next to `label`, if that line exists
    #[must_use]
    pub fn value(&self, label: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }

    /// `Label: value` lines in display order
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect()
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn na() -> String {
    NOT_AVAILABLE.to_owned()
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
