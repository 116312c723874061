// ABOUTME: Error handling for the tracking engine, re-exported from the core crate
// ABOUTME: AppError carries an ErrorCode classifying terminal, transient, and validation faults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

pub use pedometer_core::errors::*;
