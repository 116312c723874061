// ABOUTME: Zen Pedometer CLI - inspect and edit the persisted step state from the command line
// ABOUTME: Replays recorded sensor readings through the tracking service and prints the dashboard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors
//!
//! Usage:
//! ```bash
//! # Show today's dashboard
//! zen-pedometer status
//!
//! # Feed recorded readings (one JSON object per line) through the step accountant
//! zen-pedometer replay readings.jsonl
//!
//! # Reset displayed steps and edit the profile
//! zen-pedometer reset
//! zen-pedometer set-goal 12000
//! zen-pedometer set-weight 72.5
//! zen-pedometer set-height 181
//! ```
//!
//! Replay lines look like `{"reading": 1520.0, "timestamp": "2025-01-14T08:30:00"}`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use zen_pedometer::clock::{Clock, SystemClock};
use zen_pedometer::config::PedometerConfig;
use zen_pedometer::dashboard::{DashboardSnapshot, DashboardView};
use zen_pedometer::logging::LoggingConfig;
use zen_pedometer::replay;
use zen_pedometer::sensor::SimulatedSensor;
use zen_pedometer::service::{TrackingHandle, TrackingService};
use zen_pedometer::session::TrackingSession;
use zen_pedometer::storage::{StateRepository, Store};

#[derive(Parser)]
#[command(
    name = "zen-pedometer",
    about = "Zen Pedometer step tracker",
    long_about = "Inspect, replay, and edit the persisted step totals of the Zen Pedometer tracker."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Preference store path override
    #[arg(long, global = true)]
    store_path: Option<PathBuf>,

    /// Print the dashboard as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Show the current dashboard
    Status,

    /// Replay recorded sensor readings from a JSON-lines file
    Replay {
        /// File with one `{"reading", "timestamp"}` object per line
        file: PathBuf,
    },

    /// Reset displayed steps to zero
    Reset,

    /// Set the daily step goal (1000-50000)
    SetGoal {
        /// Steps per day
        goal: u32,
    },

    /// Set body weight in kilograms (30-150)
    SetWeight {
        /// Weight in kilograms
        weight_kg: f64,
    },

    /// Set body height in centimeters (100-250)
    SetHeight {
        /// Height in centimeters
        height_cm: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    LoggingConfig::from_env().verbose(cli.verbose).init()?;

    let mut config = PedometerConfig::from_env();
    if let Some(path) = cli.store_path {
        config.storage.path = path;
    }
    config.validate()?;
    config.log_summary();

    let snapshot = match cli.command {
        Command::Status => {
            let handle = spawn(&config, Arc::new(SystemClock))?;
            handle.start().await?;
            finish(handle).await?
        }
        Command::Replay { file } => replay_file(&config, &file).await?,
        Command::Reset => {
            let handle = spawn(&config, Arc::new(SystemClock))?;
            handle.reset_steps().await?;
            info!("Displayed steps reset");
            finish(handle).await?
        }
        Command::SetGoal { goal } => {
            let handle = spawn(&config, Arc::new(SystemClock))?;
            handle.set_step_goal(goal).await?;
            finish(handle).await?
        }
        Command::SetWeight { weight_kg } => {
            let handle = spawn(&config, Arc::new(SystemClock))?;
            handle.set_weight(weight_kg).await?;
            finish(handle).await?
        }
        Command::SetHeight { height_cm } => {
            let handle = spawn(&config, Arc::new(SystemClock))?;
            handle.set_height(height_cm).await?;
            finish(handle).await?
        }
    };

    if cli.json {
        let output = serde_json::json!({
            "snapshot": snapshot,
            "metrics": snapshot.metrics(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", DashboardView::render(&snapshot));
    }
    Ok(())
}

fn spawn(config: &PedometerConfig, clock: Arc<dyn Clock>) -> Result<TrackingHandle> {
    let store = Store::from_config(&config.storage)?;
    let session = TrackingSession::new(
        StateRepository::new(store),
        config.accounting.accountant(),
        Box::new(SimulatedSensor::new()),
    )?
    .with_queue_capacity(config.service.event_queue_capacity);
    Ok(TrackingService::spawn(session, clock, &config.service))
}

async fn finish(handle: TrackingHandle) -> Result<DashboardSnapshot> {
    handle.stop().await?;
    let snapshot = handle.snapshot();
    handle.shutdown().await?;
    Ok(snapshot)
}

async fn replay_file(config: &PedometerConfig, file: &Path) -> Result<DashboardSnapshot> {
    let contents = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let events =
        replay::parse_events(&contents).with_context(|| format!("{}", file.display()))?;
    let repository = StateRepository::new(Store::from_config(&config.storage)?);
    Ok(replay::replay(repository, config.accounting.accountant(), &config.service, &events).await?)
}
