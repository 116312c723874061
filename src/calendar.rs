// ABOUTME: Calendar bucket key derivation for daily, ISO-weekly, monthly, and yearly step totals
// ABOUTME: Converts local wall-clock times to bucket ids and to the millisecond form kept in storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

//! Calendar helpers
//!
//! Week buckets follow ISO-8601: weeks start on Monday and belong to the ISO
//! week-year, so the days around New Year map to exactly one week key
//! (`2024-12-30` is `2025W01`). Day, month, and year keys use the plain
//! calendar date.

use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime};
use pedometer_core::models::BucketKeys;

/// Bucket keys for every period at `now`
#[must_use]
pub fn bucket_keys(now: &NaiveDateTime) -> BucketKeys {
    let date = now.date();
    let iso = date.iso_week();
    BucketKeys {
        day: day_key(now),
        week: format!("{}W{:02}", iso.year(), iso.week()),
        month: date.format("%Y%m").to_string(),
        year: date.format("%Y").to_string(),
    }
}

/// Day key (`yyyyMMdd`) for `now`
#[must_use]
pub fn day_key(now: &NaiveDateTime) -> String {
    now.date().format("%Y%m%d").to_string()
}

/// Whether `candidate` names a later bucket than `live`
///
/// Keys are zero-padded and most-significant first, so string order is
/// calendar order. An empty `live` key (no bucket yet) precedes every key.
#[must_use]
pub fn is_later_key(candidate: &str, live: &str) -> bool {
    candidate > live
}

/// Midnight at the start of the day containing `now`
#[must_use]
pub fn start_of_day(now: &NaiveDateTime) -> NaiveDateTime {
    now.date().and_time(NaiveTime::MIN)
}

/// Milliseconds between two instants, floored at zero when the clock went backwards
#[must_use]
pub fn elapsed_ms(from: &NaiveDateTime, to: &NaiveDateTime) -> i64 {
    to.signed_duration_since(*from).num_milliseconds().max(0)
}

/// Storage form of a wall-clock time
#[must_use]
pub fn to_millis(time: &NaiveDateTime) -> i64 {
    time.and_utc().timestamp_millis()
}

/// Inverse of [`to_millis`]; `0` and negative values mean "never"
#[must_use]
pub fn from_millis(millis: i64) -> Option<NaiveDateTime> {
    if millis <= 0 {
        return None;
    }
    DateTime::from_timestamp_millis(millis).map(|utc| utc.naive_utc())
}
