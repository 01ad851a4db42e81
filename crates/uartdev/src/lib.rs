// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Portable UART channel.
//!
//! A [`SerialChannel`] pairs a [`Transport`] with an inbound and an outbound
//! [`CircularBuffer`]. It offers blocking primitives that talk to the
//! transport directly, and interrupt-driven primitives that only touch the
//! buffers while a bottom half moves bytes between buffers and transport.
//!
//! Backends:
//! - [`RegisterTransport`]: memory-mapped register bank (STM32F4 USART, PL011)
//! - [`HostTransport`]: OS character device with a [`PollingService`] thread
//!   standing in for the interrupt (`std` feature)
//!
//! # Example
//!
//! ```
//! use uartdev::{MockTransport, SerialChannel};
//!
//! let channel = SerialChannel::new(MockTransport::new());
//! channel.enqueue_byte(b'A').unwrap();
//! channel.bottom_half();
//! assert_eq!(channel.transport().output(), b"A");
//! assert!(!channel.transmit_armed());
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod channel;
pub mod config;
pub mod error;
pub mod transport;

pub use channel::{BufferResize, FaultState, SerialChannel, Serviced};
pub use config::ChannelConfig;
#[cfg(feature = "std")]
pub use config::{ConfigError, HostConfig};
pub use error::{BufferEmpty, BufferFull, DataError, InvalidCapacity};
#[cfg(feature = "std")]
pub use transport::host::{
    CharDevice, HostError, HostTransport, MemoryDevice, PollingService, PseudoInterrupt,
};
#[cfg(any(test, feature = "std"))]
pub use transport::MockTransport;
pub use transport::{PL011, RegisterMap, RegisterTransport, STM32F4_USART, StatusFlag, Transport};
pub use uartdev_buffer::{CircularBuffer, DEFAULT_CAPACITY, ResizeOutcome};
