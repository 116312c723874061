// ABOUTME: Persisted step state, user profile, and calendar bucket models
// ABOUTME: Re-exported from the core crate so callers only depend on zen_pedometer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

pub use pedometer_core::models::*;
