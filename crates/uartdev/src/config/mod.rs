// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Channel configuration.
//!
//! [`ChannelConfig`] is all a bare-metal channel needs. Hosts load a
//! [`HostConfig`] from TOML, which also names the device and polling cadence.

#[cfg(all(test, feature = "std"))]
mod config_test;
#[cfg(feature = "std")]
mod host;

#[cfg(feature = "std")]
pub use host::{
    ConfigError, ENV_BAUD_RATE, ENV_CAPACITY, ENV_DEVICE, ENV_POLL_INTERVAL_MS, HostConfig,
};

use serde::Deserialize;
use uartdev_buffer::{DEFAULT_CAPACITY, InvalidCapacity};

/// Buffer sizing for a [`SerialChannel`](crate::SerialChannel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelConfig {
    /// Slots per buffer; one slot stays unused.
    pub capacity: usize,
}

impl ChannelConfig {
    /// Configuration with `capacity` slots per buffer.
    #[must_use]
    pub const fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Reject a zero capacity.
    pub const fn validate(&self) -> Result<(), InvalidCapacity> {
        if self.capacity == 0 {
            return Err(InvalidCapacity);
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}
