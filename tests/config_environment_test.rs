// ABOUTME: Integration tests for environment-driven configuration loading
// ABOUTME: Runs serially because every test mutates process environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use zen_pedometer::accounting::RebootPolicy;
use zen_pedometer::config::{PedometerConfig, StorageBackend};
use zen_pedometer::logging::{LogFormat, LoggingConfig};

const VARS: [&str; 5] = [
    "ZEN_STORE_BACKEND",
    "ZEN_STORE_PATH",
    "ZEN_REBOOT_POLICY",
    "ZEN_REBOOT_DROP_THRESHOLD",
    "ZEN_EVENT_QUEUE_CAPACITY",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();
    let config = PedometerConfig::from_env();
    assert_eq!(config, PedometerConfig::default());
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env();
    env::set_var("ZEN_STORE_BACKEND", "memory");
    env::set_var("ZEN_STORE_PATH", "/tmp/zen-test.json");
    env::set_var("ZEN_REBOOT_POLICY", "ignore");
    env::set_var("ZEN_REBOOT_DROP_THRESHOLD", "250");
    env::set_var("ZEN_EVENT_QUEUE_CAPACITY", "8");

    let config = PedometerConfig::from_env();
    assert_eq!(config.storage.backend, StorageBackend::Memory);
    assert_eq!(config.storage.path, PathBuf::from("/tmp/zen-test.json"));
    assert_eq!(config.accounting.reboot_policy, RebootPolicy::Ignore);
    assert!((config.accounting.reboot_drop_threshold - 250.0).abs() < f64::EPSILON);
    assert_eq!(config.service.event_queue_capacity, 8);
    assert_eq!(config.accounting.accountant().reboot_policy(), RebootPolicy::Ignore);
    clear_env();
}

#[test]
#[serial]
fn test_unparseable_values_fall_back() {
    clear_env();
    env::set_var("ZEN_REBOOT_DROP_THRESHOLD", "lots");
    env::set_var("ZEN_EVENT_QUEUE_CAPACITY", "-3");

    let config = PedometerConfig::from_env();
    assert_eq!(config, PedometerConfig::default());
    clear_env();
}

#[test]
#[serial]
fn test_zero_capacity_fails_validation() {
    clear_env();
    env::set_var("ZEN_EVENT_QUEUE_CAPACITY", "0");
    let err = PedometerConfig::from_env().validate().unwrap_err();
    assert_eq!(err.code, zen_pedometer::errors::ErrorCode::ConfigInvalid);
    clear_env();
}

#[test]
#[serial]
fn test_logging_config_from_env() {
    env::set_var("LOG_FORMAT", "json");
    env::set_var("SERVICE_NAME", "zen-test");
    let config = LoggingConfig::from_env();
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.service_name, "zen-test");
    env::remove_var("LOG_FORMAT");
    env::remove_var("SERVICE_NAME");
}
