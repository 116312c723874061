// ABOUTME: Maps PersistedState and UserProfile onto flat preference keys and back
// ABOUTME: Flushes one epoch's keys in a single batch and reads period totals by calendar key
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

use super::{KeyValueStore, WriteBatch};
use crate::calendar::{bucket_keys, day_key, from_millis, to_millis};
use chrono::NaiveDateTime;
use pedometer_core::constants::keys;
use pedometer_core::constants::sensor::UNAVAILABLE_READING;
use pedometer_core::errors::{AppError, AppResult};
use pedometer_core::models::{BucketTotal, PersistedState, Period, StepBuckets, UserProfile};
use tracing::warn;

/// Typed view of the preference store
#[derive(Debug)]
pub struct StateRepository<S> {
    store: S,
}

impl<S: KeyValueStore> StateRepository<S> {
    /// Wrap a store
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Load the accounting state, defaulting every missing key
    ///
    /// The walking session is always loaded closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read
    pub fn load_state(&self) -> AppResult<PersistedState> {
        let store = &self.store;
        let initial = store.get_float(keys::INITIAL_STEP_COUNT, UNAVAILABLE_READING)?;
        let last_reset_time = from_millis(store.get_long(keys::LAST_RESET_TIME, 0)?);

        let daily_key = last_reset_time.as_ref().map(day_key).unwrap_or_default();
        let buckets = StepBuckets {
            daily: self.load_bucket(Period::Daily, daily_key)?,
            weekly: self.load_bucket(
                Period::Weekly,
                store.get_string(keys::LAST_RESET_WEEK, "")?,
            )?,
            monthly: self.load_bucket(
                Period::Monthly,
                store.get_string(keys::LAST_RESET_MONTH, "")?,
            )?,
            yearly: self.load_bucket(
                Period::Yearly,
                store.get_string(keys::LAST_RESET_YEAR, "")?,
            )?,
        };

        Ok(PersistedState {
            initial_step_count: (initial >= 0.0).then_some(initial),
            current_step_count: store.get_float(keys::CURRENT_STEP_COUNT, 0.0)?,
            previous_step_count: store.get_float(keys::PREVIOUS_STEP_COUNT, 0.0)?,
            epoch_carried_steps: store.get_float(keys::EPOCH_CARRIED_STEPS, 0.0)?,
            last_reset_time,
            walking_start_time: from_millis(store.get_long(keys::WALKING_START_TIME, 0)?),
            is_walking: false,
            total_walking_time_ms: store.get_long(keys::TOTAL_WALKING_TIME, 0)?,
            buckets,
            is_sensor_available: store.get_bool(keys::IS_SENSOR_AVAILABLE, true)?,
        })
    }

    fn load_bucket(&self, period: Period, key: String) -> AppResult<BucketTotal> {
        if key.is_empty() {
            return Ok(BucketTotal::default());
        }
        let total = self.store.get_float(&period.storage_key(&key), 0.0)?;
        Ok(BucketTotal { key, total })
    }

    /// Write every accounting key in one batch
    ///
    /// Only the live bucket of each period is written; older bucket keys keep
    /// their last totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the batch
    pub fn save_state(&self, state: &PersistedState) -> AppResult<()> {
        let mut batch = WriteBatch::new();
        batch
            .put_float(
                keys::INITIAL_STEP_COUNT,
                state.initial_step_count.unwrap_or(UNAVAILABLE_READING),
            )
            .put_float(keys::CURRENT_STEP_COUNT, state.current_step_count)
            .put_float(keys::PREVIOUS_STEP_COUNT, state.previous_step_count)
            .put_float(keys::EPOCH_CARRIED_STEPS, state.epoch_carried_steps)
            .put_long(
                keys::LAST_RESET_TIME,
                state.last_reset_time.as_ref().map_or(0, to_millis),
            )
            .put_long(
                keys::WALKING_START_TIME,
                state.walking_start_time.as_ref().map_or(0, to_millis),
            )
            .put_long(keys::TOTAL_WALKING_TIME, state.total_walking_time_ms)
            .put_string(keys::LAST_RESET_WEEK, state.buckets.weekly.key.as_str())
            .put_string(keys::LAST_RESET_MONTH, state.buckets.monthly.key.as_str())
            .put_string(keys::LAST_RESET_YEAR, state.buckets.yearly.key.as_str())
            .put_bool(keys::IS_SENSOR_AVAILABLE, state.is_sensor_available);

        for period in Period::ALL {
            let bucket = state.buckets.get(period);
            if !bucket.key.is_empty() {
                batch.put_float(period.storage_key(&bucket.key), bucket.total);
            }
        }

        self.store.commit(batch)
    }

    /// Record whether the step counter hardware exists
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write
    pub fn save_sensor_available(&self, available: bool) -> AppResult<()> {
        self.store.put_bool(keys::IS_SENSOR_AVAILABLE, available)
    }

    /// Load the user profile; stored values outside their range fall back to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read
    pub fn load_profile(&self) -> AppResult<UserProfile> {
        let defaults = UserProfile::default();
        let mut profile = defaults;

        let goal = self
            .store
            .get_int(keys::STEP_GOAL, i32::try_from(defaults.step_goal).unwrap_or(i32::MAX))?;
        if let Err(e) = u32::try_from(goal)
            .map_err(|_| AppError::invalid_input(format!("negative step goal {goal}")))
            .and_then(|goal| profile.set_step_goal(goal))
        {
            warn!(error = %e, "Stored step goal rejected, using default");
        }
        if let Err(e) = profile.set_weight(self.store.get_float(keys::WEIGHT, defaults.weight_kg)?) {
            warn!(error = %e, "Stored weight rejected, using default");
        }
        if let Err(e) = profile.set_height(self.store.get_float(keys::HEIGHT, defaults.height_cm)?) {
            warn!(error = %e, "Stored height rejected, using default");
        }
        Ok(profile)
    }

    /// Write the user profile in one batch
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the batch
    pub fn save_profile(&self, profile: &UserProfile) -> AppResult<()> {
        let goal = i32::try_from(profile.step_goal)
            .map_err(|_| AppError::invalid_input("step goal does not fit the store"))?;
        let mut batch = WriteBatch::new();
        batch
            .put_int(keys::STEP_GOAL, goal)
            .put_float(keys::WEIGHT, profile.weight_kg)
            .put_float(keys::HEIGHT, profile.height_cm);
        self.store.commit(batch)
    }

    /// Stored total for the bucket of `period` containing `now`
    ///
    /// Returns zero when that bucket has never been written, e.g. on the first
    /// day of a new week before any step event.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read
    pub fn bucket_total(&self, period: Period, now: &NaiveDateTime) -> AppResult<f64> {
        let keys = bucket_keys(now);
        self.store
            .get_float(&period.storage_key(keys.get(period)), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;

    fn noon(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_fresh_store_loads_default_state() {
        let repo = StateRepository::new(MemoryStore::new());
        let state = repo.load_state().unwrap();
        assert_eq!(state, PersistedState::default());
        assert_eq!(repo.load_profile().unwrap(), UserProfile::default());
    }

    #[test]
    fn test_state_round_trip_closes_walking_session() {
        let repo = StateRepository::new(MemoryStore::new());
        let mut state = PersistedState {
            initial_step_count: Some(500.0),
            current_step_count: 620.0,
            previous_step_count: 620.0,
            last_reset_time: Some(noon(14)),
            walking_start_time: Some(noon(14)),
            is_walking: true,
            total_walking_time_ms: 90_000,
            ..PersistedState::default()
        };
        state.buckets.daily = BucketTotal {
            key: "20250114".to_owned(),
            total: 120.0,
        };
        state.buckets.weekly = BucketTotal {
            key: "2025W03".to_owned(),
            total: 900.0,
        };
        repo.save_state(&state).unwrap();

        let loaded = repo.load_state().unwrap();
        assert!(!loaded.is_walking);
        assert_eq!(
            loaded,
            PersistedState {
                is_walking: false,
                ..state
            }
        );
    }

    #[test]
    fn test_bucket_total_reads_calendar_key() {
        let store = MemoryStore::new();
        store.put_float("steps_monthly_202501", 4_321.0).unwrap();
        let repo = StateRepository::new(store);
        let total = repo.bucket_total(Period::Monthly, &noon(20)).unwrap();
        assert!((total - 4_321.0).abs() < f64::EPSILON);
        assert!(repo.bucket_total(Period::Yearly, &noon(20)).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn test_out_of_range_profile_falls_back() {
        let store = MemoryStore::new();
        store.put_int("stepGoal", 5).unwrap();
        store.put_float("height", 180.0).unwrap();
        let repo = StateRepository::new(store);
        let profile = repo.load_profile().unwrap();
        assert_eq!(profile.step_goal, 10_000);
        assert!((profile.height_cm - 180.0).abs() < f64::EPSILON);
    }
}
