// ABOUTME: Storage keys, profile limits, metric factors, and unit constants
// ABOUTME: Re-exported from the core crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

pub use pedometer_core::constants::*;
