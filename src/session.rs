// ABOUTME: Tracking session lifecycle around the step accountant and the sensor feed
// ABOUTME: Registers with the sensor, flushes every accepted snapshot, and publishes dashboard updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

//! # Tracking Session
//!
//! ```text
//! Stopped --start--> Starting --registered--> Running --stop--> Stopped
//!                       |
//!                       +--no sensor / permission denied--> Unavailable
//! ```
//!
//! The session is the only writer of [`PersistedState`]. Each sensor event is
//! run through the [`StepAccountant`] and the resulting snapshot is flushed as
//! one batch before it replaces the in-memory state. A failed flush drops the
//! update and leaves the previous state in place, so the next event from the
//! continuous feed retries naturally.
//!
//! Subscribers obtained through [`TrackingSession::subscribe`] receive a fresh
//! [`DashboardSnapshot`] after every accepted change.

use crate::accounting::StepAccountant;
use crate::dashboard::DashboardSnapshot;
use crate::sensor::{PermissionStatus, SensorEvent, StepSensor};
use crate::storage::{KeyValueStore, StateRepository};
use chrono::NaiveDateTime;
use pedometer_core::constants::sensor::UNAVAILABLE_READING;
use pedometer_core::constants::service::DEFAULT_EVENT_QUEUE_CAPACITY;
use pedometer_core::errors::{AppError, AppResult};
use pedometer_core::models::{PersistedState, UserProfile};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Why a session cannot track steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The device has no step counter
    NoSensor,
    /// Activity-recognition permission was denied or revoked
    PermissionDenied,
}

impl UnavailableReason {
    fn to_error(self) -> AppError {
        match self {
            Self::NoSensor => AppError::capability_unavailable(),
            Self::PermissionDenied => AppError::permission_denied(),
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSensor => write!(f, "no sensor"),
            Self::PermissionDenied => write!(f, "permission denied"),
        }
    }
}

/// Lifecycle state of a tracking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum SessionState {
    /// Not registered with the sensor
    Stopped,
    /// Checking capability and permission
    Starting,
    /// Registered and accepting sensor events
    Running,
    /// Terminal for this run
    Unavailable(UnavailableReason),
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Unavailable(reason) => write!(f, "unavailable ({reason})"),
        }
    }
}

/// Lifecycle wrapper that owns the accounting state, its store, and the sensor
pub struct TrackingSession<S> {
    repository: StateRepository<S>,
    accountant: StepAccountant,
    sensor: Box<dyn StepSensor>,
    state: PersistedState,
    profile: UserProfile,
    lifecycle: SessionState,
    queue_capacity: usize,
    snapshots: watch::Sender<DashboardSnapshot>,
}

impl<S: KeyValueStore> TrackingSession<S> {
    /// Load persisted state and profile into a stopped session
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read
    pub fn new(
        repository: StateRepository<S>,
        accountant: StepAccountant,
        sensor: Box<dyn StepSensor>,
    ) -> AppResult<Self> {
        let state = repository.load_state()?;
        let profile = repository.load_profile()?;
        let (snapshots, _) = watch::channel(DashboardSnapshot::capture(
            &state,
            &profile,
            SessionState::Stopped,
        ));

        debug!(
            anchored = state.initial_step_count.is_some(),
            day = %state.buckets.daily.key,
            "Tracking session loaded"
        );

        Ok(Self {
            repository,
            accountant,
            sensor,
            state,
            profile,
            lifecycle: SessionState::Stopped,
            queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            snapshots,
        })
    }

    /// Capacity of the sensor event queue created by [`Self::start`]
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn lifecycle(&self) -> SessionState {
        self.lifecycle
    }

    /// Current accounting state
    #[must_use]
    pub const fn state(&self) -> &PersistedState {
        &self.state
    }

    /// Current user profile
    #[must_use]
    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Dashboard figures for the current state
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot::capture(&self.state, &self.profile, self.lifecycle)
    }

    /// Receiver updated after every accepted state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshots.subscribe()
    }

    /// Check capability and permission, roll buckets over, and register with the sensor
    ///
    /// Returns the receiving end of the sensor feed; the caller forwards its
    /// events to [`Self::on_sensor_event`].
    ///
    /// # Errors
    ///
    /// - `CapabilityUnavailable` when the device has no step counter
    /// - `PermissionDenied` when activity recognition is not granted
    /// - `InvalidState` when the session is not stopped
    /// - any error from sensor registration
    pub async fn start(&mut self, now: NaiveDateTime) -> AppResult<mpsc::Receiver<SensorEvent>> {
        match self.lifecycle {
            SessionState::Stopped => {}
            SessionState::Unavailable(reason) => return Err(reason.to_error()),
            other => {
                return Err(AppError::invalid_state(format!(
                    "cannot start a session that is {other}"
                )))
            }
        }
        self.lifecycle = SessionState::Starting;

        if !self.sensor.is_available() {
            warn!("No step counter sensor on this device");
            let mut next = self.state.clone();
            next.is_sensor_available = false;
            if let Err(e) = self.repository.save_sensor_available(false) {
                error!(error = %e, "Failed to record missing sensor");
            }
            self.state = next;
            return Err(self.become_unavailable(UnavailableReason::NoSensor));
        }

        if self.sensor.permission() == PermissionStatus::Denied {
            warn!("Activity recognition permission denied, step tracking disabled");
            let next = self.accountant.observe(UNAVAILABLE_READING, now, &self.state);
            self.commit_or_log(next, "permission denied");
            return Err(self.become_unavailable(UnavailableReason::PermissionDenied));
        }

        let mut next = self.accountant.roll_over(now, &self.state);
        next.is_sensor_available = true;
        self.commit_or_log(next, "startup rollover");

        let (sink, events) = mpsc::channel(self.queue_capacity);
        if let Err(e) = self.sensor.register(sink).await {
            error!(error = %e, "Sensor registration failed");
            self.lifecycle = SessionState::Stopped;
            self.publish();
            return Err(e);
        }

        self.lifecycle = SessionState::Running;
        self.publish();
        info!(
            day = %self.state.buckets.daily.key,
            week = %self.state.buckets.weekly.key,
            "Step tracking started"
        );
        Ok(events)
    }

    /// Apply one sensor event
    ///
    /// Events arriving while the session is not running are ignored. The
    /// unavailable sentinel ends tracking for this run. Faults never escape:
    /// a failed flush is logged and the event is dropped.
    pub async fn on_sensor_event(&mut self, event: SensorEvent) {
        if self.lifecycle != SessionState::Running {
            debug!(state = %self.lifecycle, reading = event.reading, "Sensor event ignored");
            return;
        }

        let next = self
            .accountant
            .observe(event.reading, event.timestamp, &self.state);

        if event.is_unavailable() {
            let next = self.accountant.close_session(event.timestamp, &next);
            self.commit_or_log(next, "permission revoked");
            self.sensor.unregister().await;
            let e = self.become_unavailable(UnavailableReason::PermissionDenied);
            error!(error = %e, "Step counter reported unavailable, tracking ended for this run");
            return;
        }

        self.commit_or_log(next, "sensor event");
    }

    /// Host is suspending: close the walking session and flush
    pub fn on_suspend(&mut self, now: NaiveDateTime) {
        let next = self.accountant.close_session(now, &self.state);
        self.commit_or_log(next, "suspend");
    }

    /// Close the walking session, flush, and unregister from the sensor
    ///
    /// Stopping a session that is not running changes nothing.
    pub async fn stop(&mut self, now: NaiveDateTime) {
        if self.lifecycle != SessionState::Running {
            debug!(state = %self.lifecycle, "Stop requested for idle session");
            return;
        }
        self.on_suspend(now);
        self.sensor.unregister().await;
        self.lifecycle = SessionState::Stopped;
        self.publish();
        info!(
            total_walking_time_ms = self.state.total_walking_time_ms,
            "Step tracking stopped"
        );
    }

    /// User-initiated reset of displayed steps
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless the session is running or stopped
    /// - `TransientReadError` if the reset could not be flushed; state is unchanged
    pub fn reset(&mut self, now: NaiveDateTime) -> AppResult<()> {
        if !matches!(self.lifecycle, SessionState::Running | SessionState::Stopped) {
            return Err(AppError::invalid_state(format!(
                "cannot reset steps while {}",
                self.lifecycle
            )));
        }
        let next = self.accountant.reset(now, &self.state);
        self.commit(next)
    }

    /// Validate and persist a new daily step goal
    ///
    /// # Errors
    ///
    /// - `ValueOutOfRange` outside 1000..=50000; nothing changes
    /// - `TransientReadError` if the profile could not be flushed
    pub fn set_step_goal(&mut self, goal: u32) -> AppResult<()> {
        let mut profile = self.profile;
        profile.set_step_goal(goal)?;
        self.commit_profile(profile)
    }

    /// Validate and persist a new body weight in kilograms
    ///
    /// # Errors
    ///
    /// - `ValueOutOfRange` outside 30..=150; nothing changes
    /// - `TransientReadError` if the profile could not be flushed
    pub fn set_weight(&mut self, weight_kg: f64) -> AppResult<()> {
        let mut profile = self.profile;
        profile.set_weight(weight_kg)?;
        self.commit_profile(profile)
    }

    /// Validate and persist a new body height in centimeters
    ///
    /// # Errors
    ///
    /// - `ValueOutOfRange` outside 100..=250; nothing changes
    /// - `TransientReadError` if the profile could not be flushed
    pub fn set_height(&mut self, height_cm: f64) -> AppResult<()> {
        let mut profile = self.profile;
        profile.set_height(height_cm)?;
        self.commit_profile(profile)
    }

    fn become_unavailable(&mut self, reason: UnavailableReason) -> AppError {
        self.lifecycle = SessionState::Unavailable(reason);
        self.publish();
        reason.to_error()
    }

    /// Flush `next`, then adopt it
    fn commit(&mut self, next: PersistedState) -> AppResult<()> {
        self.repository.save_state(&next).map_err(|e| {
            AppError::transient("failed to flush step state, update dropped").with_source(e)
        })?;
        self.state = next;
        self.publish();
        Ok(())
    }

    fn commit_or_log(&mut self, next: PersistedState, context: &str) {
        if let Err(e) = self.commit(next) {
            warn!(
                error = %e,
                context,
                reading = self.state.current_step_count,
                "State update dropped"
            );
        }
    }

    fn commit_profile(&mut self, profile: UserProfile) -> AppResult<()> {
        self.repository.save_profile(&profile).map_err(|e| {
            AppError::transient("failed to flush user profile, change dropped").with_source(e)
        })?;
        self.profile = profile;
        self.publish();
        info!(
            step_goal = profile.step_goal,
            weight_kg = profile.weight_kg,
            height_cm = profile.height_cm,
            "User profile updated"
        );
        Ok(())
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SimulatedSensor;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;
    use pedometer_core::errors::ErrorCode;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn session(sensor: SimulatedSensor) -> TrackingSession<MemoryStore> {
        TrackingSession::new(
            StateRepository::new(MemoryStore::new()),
            StepAccountant::default(),
            Box::new(sensor),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_start_registers_and_accepts_events() {
        let sensor = SimulatedSensor::new();
        let feed = sensor.feed();
        let mut session = session(sensor);

        let mut events = session.start(at(8, 0)).await.unwrap();
        assert_eq!(session.lifecycle(), SessionState::Running);
        assert!(feed.is_registered());

        assert!(feed.push(1_000.0, at(8, 1)).await);
        assert!(feed.push(1_250.0, at(8, 2)).await);
        for _ in 0..2 {
            let event = events.recv().await.unwrap();
            session.on_sensor_event(event).await;
        }
        assert_eq!(session.snapshot().displayed_steps, Some(250));

        session.stop(at(8, 5)).await;
        assert_eq!(session.lifecycle(), SessionState::Stopped);
        assert!(!feed.is_registered());
    }

    #[tokio::test]
    async fn test_missing_sensor_is_terminal() {
        let mut session = session(SimulatedSensor::missing());
        let err = session.start(at(8, 0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CapabilityUnavailable);
        assert_eq!(
            session.lifecycle(),
            SessionState::Unavailable(UnavailableReason::NoSensor)
        );
        assert!(!session.state().is_sensor_available);

        // surfaced again, never retried
        let err = session.start(at(8, 1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CapabilityUnavailable);
    }

    #[tokio::test]
    async fn test_events_ignored_unless_running() {
        let mut session = session(SimulatedSensor::new());
        session
            .on_sensor_event(SensorEvent::new(500.0, at(9, 0)))
            .await;
        assert_eq!(session.state(), &PersistedState::default());
    }

    #[test]
    fn test_rejected_goal_changes_nothing() {
        let mut session = session(SimulatedSensor::new());
        let err = session.set_step_goal(999).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert_eq!(session.profile().step_goal, 10_000);

        session.set_step_goal(50_000).unwrap();
        assert_eq!(session.snapshot().step_goal, 50_000);
    }
}
