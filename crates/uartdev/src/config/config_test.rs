// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for channel and host configuration.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::io::Write;
use std::string::{String, ToString};
use std::time::Duration;

use super::*;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn channel_config_defaults_and_validation() {
    assert_eq!(ChannelConfig::default().capacity, 128);
    assert!(ChannelConfig::default().validate().is_ok());
    assert_eq!(
        ChannelConfig::with_capacity(0).validate(),
        Err(InvalidCapacity)
    );
}

#[test]
fn host_defaults() {
    let config = HostConfig::default();
    assert_eq!(config.device, "/dev/serial0");
    assert_eq!(config.baud_rate, 115_200);
    assert_eq!(config.capacity, 128);
    assert_eq!(config.poll_interval(), Duration::from_millis(100));
    assert_eq!(config.read_timeout(), Duration::from_millis(10));
    assert!(config.validate().is_ok());
}

#[test]
fn partial_toml_keeps_remaining_defaults() {
    let config = HostConfig::from_toml_str(
        r#"
        device = "/dev/ttyUSB0"
        capacity = 256
        "#,
    )
    .unwrap();
    assert_eq!(config.device, "/dev/ttyUSB0");
    assert_eq!(config.capacity, 256);
    assert_eq!(config.baud_rate, 115_200);
    assert_eq!(config.channel(), ChannelConfig::with_capacity(256));
}

#[test]
fn unknown_field_is_a_parse_error() {
    let err = HostConfig::from_toml_str("parity = \"even\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn overrides_replace_file_values() {
    let mut config = HostConfig::default();
    config
        .apply_overrides(env_from(&[
            (ENV_DEVICE, "/dev/ttyAMA0"),
            (ENV_BAUD_RATE, "9600"),
            (ENV_CAPACITY, " 64 "),
            (ENV_POLL_INTERVAL_MS, "5"),
        ]))
        .unwrap();
    assert_eq!(config.device, "/dev/ttyAMA0");
    assert_eq!(config.baud_rate, 9600);
    assert_eq!(config.capacity, 64);
    assert_eq!(config.poll_interval_ms, 5);
}

#[test]
fn unparsable_override_names_the_variable() {
    let mut config = HostConfig::default();
    let err = config
        .apply_overrides(env_from(&[(ENV_BAUD_RATE, "fast")]))
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidOverride { key: ENV_BAUD_RATE, ref value } if value == "fast"
    ));
}

#[test]
fn validate_rejects_zero_fields() {
    let zero_capacity = HostConfig {
        capacity: 0,
        ..HostConfig::default()
    };
    assert!(matches!(
        zero_capacity.validate(),
        Err(ConfigError::Invalid(_))
    ));

    let empty_device = HostConfig {
        device: "  ".to_string(),
        ..HostConfig::default()
    };
    assert!(empty_device.validate().is_err());

    let zero_baud = HostConfig {
        baud_rate: 0,
        ..HostConfig::default()
    };
    assert!(zero_baud.validate().is_err());
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "baud_rate = 57600").unwrap();
    writeln!(file, "poll_interval_ms = 20").unwrap();

    let config = HostConfig::load(file.path()).unwrap();
    assert_eq!(config.baud_rate, 57_600);
    assert_eq!(config.poll_interval_ms, 20);
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = HostConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn load_rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "capacity = 0").unwrap();
    assert!(matches!(
        HostConfig::load(file.path()),
        Err(ConfigError::Invalid(_))
    ));
}
