// ABOUTME: Replays recorded step-counter readings through a tracking service on a manual clock
// ABOUTME: Parses JSON-lines recordings and returns the dashboard left behind by the replay
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

//! Reading replay
//!
//! A recording holds one [`SensorEvent`] per line, for example
//! `{"reading": 1520.0, "timestamp": "2025-01-14T08:30:00"}`. Blank lines and
//! lines starting with `#` are skipped.

use crate::accounting::StepAccountant;
use crate::clock::ManualClock;
use crate::config::ServiceConfig;
use crate::dashboard::DashboardSnapshot;
use crate::sensor::{SensorEvent, SimulatedSensor};
use crate::service::TrackingService;
use crate::session::TrackingSession;
use crate::storage::{KeyValueStore, StateRepository};
use pedometer_core::errors::{AppError, AppResult};
use std::sync::Arc;
use tracing::{info, warn};

/// Parse a JSON-lines recording
///
/// # Errors
///
/// Returns `InvalidInput` naming the first malformed line (1-based)
pub fn parse_events(contents: &str) -> AppResult<Vec<SensorEvent>> {
    contents
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            serde_json::from_str(line).map_err(|e| {
                AppError::invalid_input(format!("line {number}: invalid reading")).with_source(e)
            })
        })
        .collect()
}

/// Feed `events` through a fresh tracking service over `repository`
///
/// The service clock follows the latest timestamp seen so far, so commands
/// issued at the end of the replay use the recording's time, not the host's.
///
/// # Errors
///
/// Returns `InvalidInput` for an empty recording, the session's start error,
/// or `InternalError` if the session stops accepting readings
pub async fn replay<S>(
    repository: StateRepository<S>,
    accountant: StepAccountant,
    config: &ServiceConfig,
    events: &[SensorEvent],
) -> AppResult<DashboardSnapshot>
where
    S: KeyValueStore + 'static,
{
    let Some(first) = events.first() else {
        return Err(AppError::invalid_input("recording contains no readings"));
    };

    let clock = Arc::new(ManualClock::new(first.timestamp));
    let sensor = SimulatedSensor::new();
    let feed = sensor.feed();
    let session = TrackingSession::new(repository, accountant, Box::new(sensor))?
        .with_queue_capacity(config.event_queue_capacity);
    let handle = TrackingService::spawn(session, clock.clone(), config);
    handle.start().await?;

    let mut latest = first.timestamp;
    for event in events {
        if event.timestamp < latest {
            warn!(timestamp = %event.timestamp, %latest, "Reading out of order, replaying anyway");
        }
        latest = latest.max(event.timestamp);
        clock.set(latest);
        if !feed.push(event.reading, event.timestamp).await {
            return Err(AppError::internal(
                "tracking session stopped accepting readings",
            ));
        }
    }
    info!(readings = events.len(), "Replay complete");

    handle.stop().await?;
    let snapshot = handle.snapshot();
    handle.shutdown().await?;
    Ok(snapshot)
}
