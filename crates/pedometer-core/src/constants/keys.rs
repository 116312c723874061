// ABOUTME: Key names for the flat key-value preference store
// ABOUTME: Matches the on-device preference schema so existing stores keep working
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

/// Absolute reading at the start of the current epoch (`-1` when unset)
pub const INITIAL_STEP_COUNT: &str = "initialStepCount";
/// Most recent absolute reading (`-1` when the sensor is unavailable)
pub const CURRENT_STEP_COUNT: &str = "currentStepCount";
/// Absolute reading at the last flush
pub const PREVIOUS_STEP_COUNT: &str = "previousStepCount";
/// Steps counted in this epoch before a detected device reboot
pub const EPOCH_CARRIED_STEPS: &str = "epochCarriedSteps";
/// Wall-clock millis of the last epoch start
pub const LAST_RESET_TIME: &str = "lastResetTime";
/// Last week bucket key rolled over
pub const LAST_RESET_WEEK: &str = "lastResetWeek";
/// Last month bucket key rolled over
pub const LAST_RESET_MONTH: &str = "lastResetMonth";
/// Last year bucket key rolled over
pub const LAST_RESET_YEAR: &str = "lastResetYear";
/// Wall-clock millis of the current walking session start
pub const WALKING_START_TIME: &str = "walkingStartTime";
/// Accumulated walking time in the current epoch (ms)
pub const TOTAL_WALKING_TIME: &str = "totalWalkingTime";
/// User step goal
pub const STEP_GOAL: &str = "stepGoal";
/// User weight (kg)
pub const WEIGHT: &str = "weight";
/// User height (cm)
pub const HEIGHT: &str = "height";
/// Whether the hardware step counter exists
pub const IS_SENSOR_AVAILABLE: &str = "isSensorAvailable";

/// Prefix for daily bucket totals
pub const DAILY_PREFIX: &str = "steps_daily_";
/// Prefix for weekly bucket totals
pub const WEEKLY_PREFIX: &str = "steps_weekly_";
/// Prefix for monthly bucket totals
pub const MONTHLY_PREFIX: &str = "steps_monthly_";
/// Prefix for yearly bucket totals
pub const YEARLY_PREFIX: &str = "steps_yearly_";
