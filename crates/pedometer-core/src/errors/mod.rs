// ABOUTME: Unified error types for step accounting, storage, and sensor lifecycle failures
// ABOUTME: Defines ErrorCode taxonomy, AppError with source chaining, and the AppResult alias
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

//! # Unified Error Handling System
//!
//! Every fallible operation in the workspace returns [`AppResult`]. The
//! [`ErrorCode`] distinguishes capability-level failures (terminal for a
//! tracking run) from transient faults (drop the current update and wait for
//! the next sensor event) and from rejected user input.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Capability (1000-1999)
    /// The device has no hardware step counter
    #[serde(rename = "CAPABILITY_UNAVAILABLE")]
    CapabilityUnavailable = 1000,
    /// The activity-recognition permission was denied or revoked
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied = 1001,

    // Transient (2000-2999)
    /// Unexpected fault while persisting or reading a sensor event
    #[serde(rename = "TRANSIENT_READ_ERROR")]
    TransientReadError = 2000,

    // Validation (3000-3999)
    /// A user-supplied value is outside its accepted range
    #[serde(rename = "VALUE_OUT_OF_RANGE")]
    ValueOutOfRange = 3000,
    /// A user-supplied value could not be interpreted
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3001,
    /// The operation is not valid in the current lifecycle state
    #[serde(rename = "INVALID_STATE")]
    InvalidState = 3002,

    // Configuration (6000-6999)
    /// Configuration is invalid
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6000,

    // Internal (9000-9999)
    /// Internal error
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Key-value store could not be read or written
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9001,
    /// Persisted data could not be encoded or decoded
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9002,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::CapabilityUnavailable => "Step counter sensor not available on this device",
            Self::PermissionDenied => "Activity recognition permission denied",
            Self::TransientReadError => "Step update could not be recorded",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::InvalidInput => "The provided input is invalid",
            Self::InvalidState => "Operation not allowed in the current tracking state",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
            Self::StorageError => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether this error ends the current tracking run
    ///
    /// Terminal errors are surfaced once and never retried automatically.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::CapabilityUnavailable | Self::PermissionDenied)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
#[error("{}: {}", .code.description(), .message)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Step counter hardware is missing
    #[must_use]
    pub fn capability_unavailable() -> Self {
        Self::new(
            ErrorCode::CapabilityUnavailable,
            "no step counter sensor present",
        )
    }

    /// Activity-recognition permission is missing
    #[must_use]
    pub fn permission_denied() -> Self {
        Self::new(
            ErrorCode::PermissionDenied,
            "activity recognition permission not granted",
        )
    }

    /// Transient fault while handling a sensor event
    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TransientReadError, message)
    }

    /// Value rejected by an inclusive range check
    #[must_use]
    pub fn out_of_range<T: fmt::Display>(field: &str, value: T, min: T, max: T) -> Self {
        Self::new(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be between {min} and {max}, got {value}"),
        )
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Operation not permitted in the current lifecycle state
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidState, message)
    }

    /// Storage error
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::storage(error.to_string()).with_source(error)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string()).with_source(error)
    }
}
