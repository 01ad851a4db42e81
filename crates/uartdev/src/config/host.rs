// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Host configuration: TOML file, then environment overrides, then validation.

use std::path::{Path, PathBuf};
use std::string::{String, ToString};
use std::time::Duration;
use std::{env, fs, io};

use serde::Deserialize;
use tracing::debug;
use uartdev_buffer::DEFAULT_CAPACITY;

use super::ChannelConfig;

/// Overrides [`HostConfig::device`].
pub const ENV_DEVICE: &str = "UARTDEV_DEVICE";
/// Overrides [`HostConfig::baud_rate`].
pub const ENV_BAUD_RATE: &str = "UARTDEV_BAUD_RATE";
/// Overrides [`HostConfig::capacity`].
pub const ENV_CAPACITY: &str = "UARTDEV_CAPACITY";
/// Overrides [`HostConfig::poll_interval_ms`].
pub const ENV_POLL_INTERVAL_MS: &str = "UARTDEV_POLL_INTERVAL_MS";

/// Configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid TOML for [`HostConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidOverride {
        /// Environment variable name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },

    /// A field holds a value the channel cannot run with.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Settings for a channel on a general-purpose host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Character device path.
    pub device: String,
    /// Line speed in baud.
    pub baud_rate: u32,
    /// Slots per channel buffer.
    pub capacity: usize,
    /// Delay between bottom-half polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Device read timeout, in milliseconds.
    pub read_timeout_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            device: "/dev/serial0".to_string(),
            baud_rate: 115_200,
            capacity: DEFAULT_CAPACITY,
            poll_interval_ms: 100,
            read_timeout_ms: 10,
        }
    }
}

impl HostConfig {
    /// Load from a TOML file, apply environment overrides, and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&text)?;
        config.apply_environment_overrides()?;
        config.validate()?;
        debug!(path = %path.display(), device = %config.device, "host configuration loaded");
        Ok(config)
    }

    /// Parse from TOML text. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `UARTDEV_*` variables from the process environment.
    pub fn apply_environment_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(device) = lookup(ENV_DEVICE) {
            self.device = device;
        }
        if let Some(value) = lookup(ENV_BAUD_RATE) {
            self.baud_rate = parse_override(ENV_BAUD_RATE, value)?;
        }
        if let Some(value) = lookup(ENV_CAPACITY) {
            self.capacity = parse_override(ENV_CAPACITY, value)?;
        }
        if let Some(value) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = parse_override(ENV_POLL_INTERVAL_MS, value)?;
        }
        Ok(())
    }

    /// Reject settings the host backend cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.trim().is_empty() {
            return Err(ConfigError::Invalid("device path is empty"));
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::Invalid("baud_rate must be non-zero"));
        }
        if self.capacity == 0 {
            return Err(ConfigError::Invalid("capacity must be non-zero"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be non-zero"));
        }
        Ok(())
    }

    /// Buffer sizing part of this configuration.
    #[must_use]
    pub const fn channel(&self) -> ChannelConfig {
        ChannelConfig::with_capacity(self.capacity)
    }

    /// Delay between bottom-half polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Device read timeout.
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

fn parse_override<V: core::str::FromStr>(
    key: &'static str,
    value: String,
) -> Result<V, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride { key, value })
}
