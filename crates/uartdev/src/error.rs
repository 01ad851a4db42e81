// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Errors raised by the serial channel.

pub use uartdev_buffer::{BufferEmpty, BufferFull, InvalidCapacity};

/// A transmit was requested with nothing to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no payload to transmit")]
pub struct DataError;
