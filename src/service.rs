// ABOUTME: Single-writer tracking service running a session inside one tokio task
// ABOUTME: Serializes sensor events and user commands through channels behind an async handle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

//! Tracking service
//!
//! [`TrackingService::spawn`] moves a [`TrackingSession`] into a background
//! task. Sensor events and commands from the [`TrackingHandle`] are handled
//! one at a time, so the session never sees two concurrent mutations.
//!
//! The sensor queue has priority: every queued reading is applied before the
//! next command, so a command sees all readings sent before it. A feed that
//! never goes idle therefore delays commands until it does; step counters
//! report at walking cadence, well below the rate the loop applies events.
//!
//! Dropping the handle (or calling [`TrackingHandle::shutdown`])
//! stops the session and ends the task.

use crate::clock::Clock;
use crate::config::ServiceConfig;
use crate::dashboard::DashboardSnapshot;
use crate::sensor::SensorEvent;
use crate::session::TrackingSession;
use crate::storage::KeyValueStore;
use pedometer_core::errors::{AppError, AppResult};
use std::future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type Reply<T> = oneshot::Sender<T>;

#[derive(Debug)]
enum Command {
    Start(Reply<AppResult<()>>),
    Stop(Reply<()>),
    Suspend(Reply<()>),
    Reset(Reply<AppResult<()>>),
    SetStepGoal(u32, Reply<AppResult<()>>),
    SetWeight(f64, Reply<AppResult<()>>),
    SetHeight(f64, Reply<AppResult<()>>),
}

/// Spawns tracking sessions onto the tokio runtime
pub struct TrackingService;

impl TrackingService {
    /// Move `session` into a background task and return its handle
    ///
    /// The session is not started; call [`TrackingHandle::start`].
    #[must_use]
    pub fn spawn<S>(
        session: TrackingSession<S>,
        clock: Arc<dyn Clock>,
        config: &ServiceConfig,
    ) -> TrackingHandle
    where
        S: KeyValueStore + 'static,
    {
        let (commands, command_rx) = mpsc::channel(config.event_queue_capacity.max(1));
        let snapshots = session.subscribe();
        let task = tokio::spawn(run(session, command_rx, clock));
        debug!("Tracking service spawned");

        TrackingHandle {
            commands,
            snapshots,
            task,
        }
    }
}

async fn run<S: KeyValueStore>(
    mut session: TrackingSession<S>,
    mut commands: mpsc::Receiver<Command>,
    clock: Arc<dyn Clock>,
) {
    let mut events: Option<mpsc::Receiver<SensorEvent>> = None;

    loop {
        // Queued readings drain before a command that arrived after them.
        tokio::select! {
            biased;
            event = next_event(&mut events) => match event {
                Some(event) => session.on_sensor_event(event).await,
                None => {
                    warn!("Sensor feed closed, stopping session");
                    events = None;
                    session.stop(clock.now()).await;
                }
            },
            command = commands.recv() => match command {
                Some(command) => handle(&mut session, &mut events, command, clock.as_ref()).await,
                None => {
                    session.stop(clock.now()).await;
                    info!("Tracking service shut down");
                    break;
                }
            },
        }
    }
}

async fn next_event(events: &mut Option<mpsc::Receiver<SensorEvent>>) -> Option<SensorEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => future::pending().await,
    }
}

async fn handle<S: KeyValueStore>(
    session: &mut TrackingSession<S>,
    events: &mut Option<mpsc::Receiver<SensorEvent>>,
    command: Command,
    clock: &dyn Clock,
) {
    let now = clock.now();
    // A dropped reply receiver only means the caller stopped waiting.
    match command {
        Command::Start(reply) => {
            let result = session.start(now).await.map(|rx| {
                *events = Some(rx);
            });
            let _ = reply.send(result);
        }
        Command::Stop(reply) => {
            session.stop(now).await;
            *events = None;
            let _ = reply.send(());
        }
        Command::Suspend(reply) => {
            session.on_suspend(now);
            let _ = reply.send(());
        }
        Command::Reset(reply) => {
            let _ = reply.send(session.reset(now));
        }
        Command::SetStepGoal(goal, reply) => {
            let _ = reply.send(session.set_step_goal(goal));
        }
        Command::SetWeight(weight_kg, reply) => {
            let _ = reply.send(session.set_weight(weight_kg));
        }
        Command::SetHeight(height_cm, reply) => {
            let _ = reply.send(session.set_height(height_cm));
        }
    }
}

/// Async front door to a spawned tracking session
pub struct TrackingHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<DashboardSnapshot>,
    task: JoinHandle<()>,
}

impl TrackingHandle {
    /// Start tracking
    ///
    /// # Errors
    ///
    /// Returns the session's start error, or `InternalError` if the service has exited
    pub async fn start(&self) -> AppResult<()> {
        self.request(Command::Start).await?
    }

    /// Stop tracking; the service keeps running for further commands
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the service has exited
    pub async fn stop(&self) -> AppResult<()> {
        self.request(Command::Stop).await
    }

    /// Host is suspending: close the walking session and flush
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the service has exited
    pub async fn suspend(&self) -> AppResult<()> {
        self.request(Command::Suspend).await
    }

    /// Reset displayed steps
    ///
    /// # Errors
    ///
    /// Returns the session's reset error, or `InternalError` if the service has exited
    pub async fn reset_steps(&self) -> AppResult<()> {
        self.request(Command::Reset).await?
    }

    /// Set the daily step goal
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` outside 1000..=50000, or `InternalError` if the service has exited
    pub async fn set_step_goal(&self, goal: u32) -> AppResult<()> {
        self.request(|reply| Command::SetStepGoal(goal, reply))
            .await?
    }

    /// Set body weight in kilograms
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` outside 30..=150, or `InternalError` if the service has exited
    pub async fn set_weight(&self, weight_kg: f64) -> AppResult<()> {
        self.request(|reply| Command::SetWeight(weight_kg, reply))
            .await?
    }

    /// Set body height in centimeters
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` outside 100..=250, or `InternalError` if the service has exited
    pub async fn set_height(&self, height_cm: f64) -> AppResult<()> {
        self.request(|reply| Command::SetHeight(height_cm, reply))
            .await?
    }

    /// Latest dashboard figures
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver updated after every accepted state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshots.clone()
    }

    /// Stop the session and wait for the service task to finish
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the task panicked
    pub async fn shutdown(self) -> AppResult<()> {
        let Self { commands, task, .. } = self;
        drop(commands);
        task.await
            .map_err(|e| AppError::internal(format!("tracking service task failed: {e}")))
    }

    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> AppResult<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| service_gone())?;
        response.await.map_err(|_| service_gone())
    }
}

fn service_gone() -> AppError {
    AppError::internal("tracking service is no longer running")
}
