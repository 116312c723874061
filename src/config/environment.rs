// ABOUTME: Environment configuration for the preference store, reboot handling, and event queues
// ABOUTME: Parses ZEN_* variables with fallbacks and validates the resulting settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

//! Environment-based configuration management

use crate::accounting::{RebootPolicy, StepAccountant};
use pedometer_core::constants::sensor::DEFAULT_REBOOT_DROP_THRESHOLD;
use pedometer_core::constants::service::DEFAULT_EVENT_QUEUE_CAPACITY;
use pedometer_core::constants::storage::DEFAULT_STORE_PATH;
use pedometer_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Preference store backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Ephemeral, lost at exit
    Memory,
    /// JSON document on disk
    #[default]
    File,
}

impl StorageBackend {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Self::Memory,
            _ => Self::File,
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::File => write!(f, "file"),
        }
    }
}

/// Preference store configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Backend selection
    pub backend: StorageBackend,
    /// Document path for the file backend
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

/// Step accounting configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AccountingConfig {
    /// Interpretation of large backwards jumps
    pub reboot_policy: RebootPolicy,
    /// Minimum drop (steps) treated as a reboot under `ReAnchor`
    pub reboot_drop_threshold: f64,
}

impl Default for AccountingConfig {
    fn default() -> Self {
        Self {
            reboot_policy: RebootPolicy::default(),
            reboot_drop_threshold: DEFAULT_REBOOT_DROP_THRESHOLD,
        }
    }
}

impl AccountingConfig {
    /// Accountant configured with these settings
    #[must_use]
    pub const fn accountant(&self) -> StepAccountant {
        StepAccountant::new(self.reboot_policy, self.reboot_drop_threshold)
    }
}

/// Tracking service configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Capacity of the sensor event and command queues
    pub event_queue_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
        }
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PedometerConfig {
    /// Preference store
    pub storage: StorageConfig,
    /// Step accounting
    pub accounting: AccountingConfig,
    /// Tracking service
    pub service: ServiceConfig,
}

impl PedometerConfig {
    /// Load configuration from `ZEN_*` environment variables
    ///
    /// Unparseable values fall back to their defaults with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let storage = StorageConfig {
            backend: env::var("ZEN_STORE_BACKEND")
                .map(|s| StorageBackend::from_str_or_default(&s))
                .unwrap_or_default(),
            path: env::var("ZEN_STORE_PATH")
                .map_or_else(|_| PathBuf::from(DEFAULT_STORE_PATH), PathBuf::from),
        };

        let accounting = AccountingConfig {
            reboot_policy: env::var("ZEN_REBOOT_POLICY")
                .map(|s| RebootPolicy::from_str_or_default(&s))
                .unwrap_or_default(),
            reboot_drop_threshold: parse_env_or(
                "ZEN_REBOOT_DROP_THRESHOLD",
                DEFAULT_REBOOT_DROP_THRESHOLD,
            ),
        };

        let service = ServiceConfig {
            event_queue_capacity: parse_env_or(
                "ZEN_EVENT_QUEUE_CAPACITY",
                DEFAULT_EVENT_QUEUE_CAPACITY,
            ),
        };

        Self {
            storage,
            accounting,
            service,
        }
    }

    /// Check the configuration for values the runtime cannot work with
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for a non-positive reboot threshold or a zero queue capacity
    pub fn validate(&self) -> AppResult<()> {
        let threshold = self.accounting.reboot_drop_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(AppError::config(format!(
                "reboot drop threshold must be a positive number of steps, got {threshold}"
            )));
        }
        if self.service.event_queue_capacity == 0 {
            return Err(AppError::config("event queue capacity must be at least 1"));
        }
        if self.storage.backend == StorageBackend::File
            && self.storage.path.as_os_str().is_empty()
        {
            return Err(AppError::config("file store requires a non-empty path"));
        }
        Ok(())
    }

    /// Log a one-line configuration summary
    pub fn log_summary(&self) {
        info!(
            store.backend = %self.storage.backend,
            store.path = %self.storage.path.display(),
            reboot.policy = %self.accounting.reboot_policy,
            reboot.threshold = self.accounting.reboot_drop_threshold,
            queue.capacity = self.service.event_queue_capacity,
            "Configuration loaded"
        );
    }
}

fn parse_env_or<T: std::str::FromStr + Copy + fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(
                variable = name,
                value = %raw,
                fallback = %default,
                "Invalid configuration value, using default"
            );
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PedometerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.accounting.reboot_policy, RebootPolicy::ReAnchor);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = PedometerConfig::default();
        config.accounting.reboot_drop_threshold = 0.0;
        assert!(config.validate().is_err());

        let mut config = PedometerConfig::default();
        config.service.event_queue_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!(StorageBackend::from_str_or_default("MEMORY"), StorageBackend::Memory);
        assert_eq!(StorageBackend::from_str_or_default("file"), StorageBackend::File);
        assert_eq!(StorageBackend::from_str_or_default("sqlite"), StorageBackend::File);
    }
}
