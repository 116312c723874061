// ABOUTME: Integration tests for step accounting across readings, rollovers, reboots, and resets
// ABOUTME: Exercises StepAccountant snapshots without any persistence or sensor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use chrono::TimeDelta;
use common::{assert_steps, at};
use zen_pedometer::accounting::{RebootPolicy, StepAccountant};
use zen_pedometer::models::{PersistedState, Period};
use zen_pedometer::storage::{MemoryStore, StateRepository};

fn run(accountant: &StepAccountant, readings: &[(f64, chrono::NaiveDateTime)]) -> PersistedState {
    readings
        .iter()
        .fold(PersistedState::default(), |state, (reading, now)| {
            accountant.observe(*reading, *now, &state)
        })
}

#[test]
fn test_worked_scenario_across_midnight() {
    let accountant = StepAccountant::default();
    let d0 = at(2025, 1, 14, 9, 0);
    let d1 = at(2025, 1, 15, 9, 0);

    let state = accountant.observe(500.0, d0, &PersistedState::default());
    assert_eq!(state.initial_step_count, Some(500.0));
    assert_steps(state.bucket_total(Period::Daily), 0.0);

    let state = accountant.observe(600.0, d0, &state);
    assert_steps(state.bucket_total(Period::Daily), 100.0);
    assert_steps(state.bucket_total(Period::Weekly), 100.0);
    assert_steps(state.bucket_total(Period::Monthly), 100.0);
    assert_steps(state.bucket_total(Period::Yearly), 100.0);

    let duplicate = accountant.observe(600.0, d0, &state);
    assert_eq!(duplicate, state);

    let state = accountant.observe(650.0, d1, &duplicate);
    assert_eq!(state.buckets.daily.key, "20250115");
    assert_eq!(state.initial_step_count, Some(600.0));
    assert_steps(state.bucket_total(Period::Daily), 50.0);
    assert_steps(state.bucket_total(Period::Weekly), 150.0);
    assert_steps(state.bucket_total(Period::Monthly), 150.0);
}

#[test]
fn test_daily_total_tracks_displacement_from_anchor() {
    let accountant = StepAccountant::default();
    let start = at(2025, 6, 2, 7, 0);
    let readings: Vec<_> = [1_000.0, 1_000.0, 1_040.0, 1_300.0, 1_301.0, 2_750.0]
        .into_iter()
        .enumerate()
        .map(|(i, r)| (r, start + TimeDelta::minutes(i as i64 * 10)))
        .collect();

    let state = run(&accountant, &readings);
    assert_steps(state.bucket_total(Period::Daily), 2_750.0 - 1_000.0);
    assert_eq!(state.displayed_steps(), Some(1_750.0));
}

#[test]
fn test_small_drop_never_decreases_totals() {
    let accountant = StepAccountant::default();
    let t = at(2025, 6, 2, 7, 0);
    let state = run(
        &accountant,
        &[(100.0, t), (400.0, t + TimeDelta::minutes(1))],
    );

    let dropped = accountant.observe(380.0, t + TimeDelta::minutes(2), &state);
    for period in Period::ALL {
        assert!(dropped.bucket_total(period) >= state.bucket_total(period));
    }

    // recovery only counts what lies above the dropped reading
    let recovered = accountant.observe(420.0, t + TimeDelta::minutes(3), &dropped);
    assert_steps(recovered.bucket_total(Period::Weekly), 300.0 + 40.0);
    assert_steps(recovered.bucket_total(Period::Daily), 320.0);
}

#[test]
fn test_reboot_carries_epoch_steps() {
    let accountant = StepAccountant::default();
    let t = at(2025, 6, 2, 7, 0);
    let state = run(
        &accountant,
        &[(5_000.0, t), (5_800.0, t + TimeDelta::minutes(30))],
    );
    assert_steps(state.bucket_total(Period::Daily), 800.0);

    // counter restarted from zero after a reboot, 40 steps since
    let state = accountant.observe(40.0, t + TimeDelta::minutes(45), &state);
    assert_steps(state.epoch_carried_steps, 800.0);
    assert_eq!(state.initial_step_count, Some(0.0));
    assert_steps(state.bucket_total(Period::Daily), 840.0);
    assert_steps(state.bucket_total(Period::Weekly), 840.0);
    assert_eq!(state.displayed_steps(), Some(840.0));

    let state = accountant.observe(100.0, t + TimeDelta::minutes(50), &state);
    assert_steps(state.bucket_total(Period::Daily), 900.0);
    assert_steps(state.bucket_total(Period::Yearly), 900.0);
}

#[test]
fn test_ignore_policy_stalls_until_counter_catches_up() {
    let accountant = StepAccountant::new(RebootPolicy::Ignore, 100.0);
    let t = at(2025, 6, 2, 7, 0);
    let state = run(
        &accountant,
        &[
            (5_000.0, t),
            (5_800.0, t + TimeDelta::minutes(30)),
            (40.0, t + TimeDelta::minutes(45)),
        ],
    );
    assert_steps(state.epoch_carried_steps, 0.0);
    assert_steps(state.bucket_total(Period::Daily), 800.0);
    assert_steps(state.bucket_total(Period::Weekly), 800.0);
}

#[test]
fn test_rollover_keeps_new_day_out_of_old_bucket() {
    let accountant = StepAccountant::default();
    let state = run(
        &accountant,
        &[
            (0.0, at(2025, 1, 31, 20, 0)),
            (700.0, at(2025, 1, 31, 21, 0)),
            (900.0, at(2025, 2, 1, 8, 0)),
        ],
    );
    assert_eq!(state.buckets.daily.key, "20250201");
    assert_eq!(state.buckets.monthly.key, "202502");
    assert_steps(state.bucket_total(Period::Daily), 200.0);
    // the new month starts from the delta of the first reading in it
    assert_steps(state.bucket_total(Period::Monthly), 200.0);
    // same ISO week (2025W05) spans both days
    assert_steps(state.bucket_total(Period::Weekly), 900.0);
}

#[test]
fn test_new_year_rolls_every_bucket() {
    let accountant = StepAccountant::default();
    let state = run(
        &accountant,
        &[
            (10.0, at(2025, 12, 31, 23, 0)),
            (110.0, at(2025, 12, 31, 23, 30)),
            (160.0, at(2026, 1, 1, 0, 10)),
        ],
    );
    assert_eq!(state.buckets.daily.key, "20260101");
    assert_eq!(state.buckets.weekly.key, "2026W01");
    assert_eq!(state.buckets.monthly.key, "202601");
    assert_eq!(state.buckets.yearly.key, "2026");
    assert_steps(state.bucket_total(Period::Yearly), 50.0);
    // 2025-12-31 already belongs to ISO week 2026W01
    assert_steps(state.bucket_total(Period::Weekly), 150.0);
}

#[test]
fn test_reset_keeps_long_period_totals_and_raw_reading() {
    let accountant = StepAccountant::default();
    let t = at(2025, 6, 2, 7, 0);
    let state = run(
        &accountant,
        &[
            (1_000.0, t),
            (1_500.0, t + TimeDelta::minutes(5)),
            (1_600.0, t + TimeDelta::minutes(6)),
        ],
    );
    assert_eq!(state.total_walking_time_ms, 6 * 60_000);

    let reset = accountant.reset(t + TimeDelta::minutes(7), &state);
    assert_steps(reset.bucket_total(Period::Daily), 0.0);
    assert_eq!(reset.displayed_steps(), Some(0.0));
    assert_eq!(reset.total_walking_time_ms, 0);
    assert!(!reset.is_walking);
    assert_steps(reset.current_step_count, 1_600.0);
    for period in [Period::Weekly, Period::Monthly, Period::Yearly] {
        assert_steps(reset.bucket_total(period), state.bucket_total(period));
    }

    let after = accountant.observe(1_650.0, t + TimeDelta::minutes(8), &reset);
    assert_steps(after.bucket_total(Period::Daily), 50.0);
    assert_steps(after.bucket_total(Period::Weekly), 650.0);
}

#[test]
fn test_unavailable_reading_changes_only_current_count() {
    let accountant = StepAccountant::default();
    let t = at(2025, 6, 2, 7, 0);
    let state = run(&accountant, &[(300.0, t), (450.0, t + TimeDelta::minutes(2))]);

    for reading in [-1.0, f64::NAN, f64::INFINITY] {
        let next = accountant.observe(reading, t + TimeDelta::minutes(3), &state);
        assert!(next.reading_unavailable());
        assert_eq!(next.displayed_steps(), None);
        assert_eq!(next.buckets, state.buckets);
        assert_eq!(next.initial_step_count, state.initial_step_count);
        assert_steps(next.previous_step_count, 450.0);
    }

    // a valid reading afterwards resumes from the last valid one
    let unavailable = accountant.observe(-1.0, t + TimeDelta::minutes(3), &state);
    let resumed = accountant.observe(470.0, t + TimeDelta::minutes(4), &unavailable);
    assert_steps(resumed.bucket_total(Period::Daily), 170.0);
    assert_steps(resumed.bucket_total(Period::Weekly), 170.0);
}

#[test]
fn test_late_event_before_midnight_keeps_stored_history() {
    let accountant = StepAccountant::default();
    let repo = StateRepository::new(MemoryStore::new());
    let jan31 = at(2025, 1, 31, 10, 0);
    let feb1 = at(2025, 2, 1, 0, 1);
    let events = [
        (1_000.0, jan31),
        (1_500.0, at(2025, 1, 31, 20, 0)),
        (1_600.0, feb1),
        (1_550.0, at(2025, 1, 31, 23, 59)),
        (1_700.0, at(2025, 2, 1, 0, 5)),
    ];

    let mut state = PersistedState::default();
    let mut high_water = Vec::new();
    for (reading, now) in events {
        state = accountant.observe(reading, now, &state);
        repo.save_state(&state).unwrap();

        for (period, when) in Period::ALL
            .into_iter()
            .flat_map(|period| [(period, jan31), (period, feb1)])
        {
            let stored = repo.bucket_total(period, &when).unwrap();
            match high_water.iter_mut().find(|(p, w, _)| *p == period && *w == when) {
                Some((_, _, max)) => {
                    assert!(stored >= *max, "{period} total at {when} fell from {max} to {stored}");
                    *max = stored;
                }
                None => high_water.push((period, when, stored)),
            }
        }
    }

    assert_eq!(state.buckets.daily.key, "20250201");
    assert_eq!(state.buckets.monthly.key, "202502");
    assert_steps(repo.bucket_total(Period::Daily, &jan31).unwrap(), 500.0);
    assert_steps(repo.bucket_total(Period::Monthly, &jan31).unwrap(), 500.0);
    assert_steps(repo.bucket_total(Period::Daily, &feb1).unwrap(), 200.0);
    assert_eq!(state.initial_step_count, Some(1_500.0));
}

#[test]
fn test_clock_set_back_does_not_reopen_earlier_buckets() {
    let accountant = StepAccountant::default();
    let t = at(2025, 3, 3, 9, 0);
    let state = run(&accountant, &[(200.0, t), (450.0, t + TimeDelta::hours(2))]);

    // clock jumps back a full week, into the previous ISO week and month
    let back = at(2025, 2, 24, 9, 0);
    let rolled = accountant.roll_over(back, &state);
    assert_eq!(rolled, state);

    let state = accountant.observe(500.0, back, &state);
    assert_eq!(state.buckets.daily.key, "20250303");
    assert_eq!(state.buckets.weekly.key, "2025W10");
    assert_eq!(state.buckets.monthly.key, "202503");
    assert_steps(state.bucket_total(Period::Daily), 300.0);
    assert_steps(state.bucket_total(Period::Weekly), 300.0);
    assert_eq!(state.initial_step_count, Some(200.0));

    let reset = accountant.reset(back, &state);
    assert_eq!(reset.buckets.daily.key, "20250303");
    assert_steps(reset.bucket_total(Period::Daily), 0.0);
}

#[test]
fn test_walking_time_never_exceeds_wall_clock_span() {
    let accountant = StepAccountant::default();
    let t = at(2025, 6, 2, 10, 0);
    let minutes = [0, 10, 5, 15, 12, 20];
    let mut state = PersistedState::default();
    for (i, offset) in minutes.into_iter().enumerate() {
        state = accountant.observe(100.0 + i as f64 * 10.0, t + TimeDelta::minutes(offset), &state);
        let latest = minutes[..=i].iter().max().copied().unwrap();
        assert!(state.total_walking_time_ms <= latest * 60_000);
    }
    assert_eq!(state.total_walking_time_ms, 20 * 60_000);
}
