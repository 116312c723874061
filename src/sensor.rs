// ABOUTME: Step counter sensor collaborator: availability, permission, and the push feed of readings
// ABOUTME: Includes a simulated sensor whose feed is driven by tests and the CLI replay command
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

//! Sensor abstraction
//!
//! A platform step counter is an external source of cumulative readings. The
//! tracking session checks [`StepSensor::is_available`] and
//! [`StepSensor::permission`] before registering a feed; once registered the
//! sensor pushes [`SensorEvent`]s into the supplied channel until it is
//! unregistered. A revoked permission is delivered as an event carrying the
//! `-1` sentinel reading.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use pedometer_core::constants::sensor::UNAVAILABLE_READING;
use pedometer_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// One reading from the hardware step counter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorEvent {
    /// Cumulative steps since device boot, or `-1` when unavailable
    pub reading: f64,
    /// Local wall-clock time of the reading
    pub timestamp: NaiveDateTime,
}

impl SensorEvent {
    /// Reading observed at `timestamp`
    #[must_use]
    pub const fn new(reading: f64, timestamp: NaiveDateTime) -> Self {
        Self { reading, timestamp }
    }

    /// Capability-revoked signal
    #[must_use]
    pub const fn unavailable(timestamp: NaiveDateTime) -> Self {
        Self::new(UNAVAILABLE_READING, timestamp)
    }

    /// Whether this event carries the unavailable sentinel
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        !self.reading.is_finite() || self.reading < 0.0
    }
}

/// Runtime permission for activity recognition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    /// Readings may be delivered
    Granted,
    /// The user declined or revoked the permission
    Denied,
}

/// Hardware step counter as seen by the tracking session
#[async_trait]
pub trait StepSensor: Send + Sync {
    /// Whether the device has a step counter at all
    fn is_available(&self) -> bool;

    /// Current activity-recognition permission
    fn permission(&self) -> PermissionStatus;

    /// Start pushing readings into `sink`
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses the subscription
    async fn register(&mut self, sink: mpsc::Sender<SensorEvent>) -> AppResult<()>;

    /// Stop pushing readings; idempotent
    async fn unregister(&mut self);
}

#[derive(Debug)]
struct SimulatedInner {
    available: bool,
    permission: PermissionStatus,
    fail_registration: bool,
    sink: Option<mpsc::Sender<SensorEvent>>,
}

/// In-process step counter driven through a [`SimulatedFeed`]
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    inner: Arc<Mutex<SimulatedInner>>,
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSensor {
    /// Available sensor with permission granted
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimulatedInner {
                available: true,
                permission: PermissionStatus::Granted,
                fail_registration: false,
                sink: None,
            })),
        }
    }

    /// Device without a step counter
    #[must_use]
    pub fn missing() -> Self {
        let sensor = Self::new();
        sensor.lock().available = false;
        sensor
    }

    /// Sensor whose permission has been denied
    #[must_use]
    pub fn permission_denied() -> Self {
        let sensor = Self::new();
        sensor.lock().permission = PermissionStatus::Denied;
        sensor
    }

    /// Sensor whose subscription request fails
    #[must_use]
    pub fn failing_registration() -> Self {
        let sensor = Self::new();
        sensor.lock().fail_registration = true;
        sensor
    }

    /// Handle used to push readings once registered
    #[must_use]
    pub fn feed(&self) -> SimulatedFeed {
        SimulatedFeed {
            inner: Arc::clone(&self.inner),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimulatedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl StepSensor for SimulatedSensor {
    fn is_available(&self) -> bool {
        self.lock().available
    }

    fn permission(&self) -> PermissionStatus {
        self.lock().permission
    }

    async fn register(&mut self, sink: mpsc::Sender<SensorEvent>) -> AppResult<()> {
        let mut inner = self.lock();
        if inner.fail_registration {
            return Err(AppError::internal("simulated sensor registration failure"));
        }
        inner.sink = Some(sink);
        info!("Simulated step sensor registered");
        Ok(())
    }

    async fn unregister(&mut self) {
        if self.lock().sink.take().is_some() {
            info!("Simulated step sensor unregistered");
        }
    }
}

/// Pushes readings into whichever sink the simulated sensor is registered with
#[derive(Debug, Clone)]
pub struct SimulatedFeed {
    inner: Arc<Mutex<SimulatedInner>>,
}

impl SimulatedFeed {
    /// Deliver a reading; returns `false` when no session is listening
    pub async fn push(&self, reading: f64, timestamp: NaiveDateTime) -> bool {
        self.send(SensorEvent::new(reading, timestamp)).await
    }

    /// Revoke the permission and deliver the unavailable sentinel
    pub async fn revoke_permission(&self, timestamp: NaiveDateTime) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .permission = PermissionStatus::Denied;
        self.send(SensorEvent::unavailable(timestamp)).await
    }

    /// Whether a session currently holds the feed
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sink
            .is_some()
    }

    async fn send(&self, event: SensorEvent) -> bool {
        let sink = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sink
            .clone();
        match sink {
            Some(sink) => sink.send(event).await.is_ok(),
            None => {
                debug!(reading = event.reading, "No listener registered, reading discarded");
                false
            }
        }
    }
}
