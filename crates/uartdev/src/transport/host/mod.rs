// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Host backend: a character device plus a software interrupt register.
//!
//! General-purpose hosts give user space no UART interrupt. The receive and
//! transmit "interrupt enables" live in a [`PseudoInterrupt`] instead, and a
//! [`PollingService`] thread runs the bottom half while any of its bits is
//! set.

mod memory;
mod poller;


pub use memory::MemoryDevice;
pub use poller::PollingService;

use std::io;
use std::string::String;

use parking_lot::Mutex;
use tracing::error;
use uartdev_buffer::atomic::{AtomicU8, Ordering};

use super::Transport;
use crate::config::ConfigError;

/// Host backend failures.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The configuration was rejected before opening the device.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The device could not be opened.
    #[error("failed to open {device}: {source}")]
    Open {
        /// Device path.
        device: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The polling thread could not be started.
    #[error("failed to spawn polling thread: {0}")]
    Spawn(#[source] io::Error),
}

/// Byte-level access to an OS character device.
pub trait CharDevice: Send {
    /// Bytes the driver has buffered for reading.
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Read one byte; `None` if nothing arrived before the read timeout.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Write one byte.
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;
}

/// Software stand-in for a UART interrupt-enable register.
#[derive(Debug, Default)]
pub struct PseudoInterrupt {
    bits: AtomicU8,
}

impl PseudoInterrupt {
    /// Receive event bit.
    pub const RECEIVE: u8 = 1 << 0;
    /// Transmit event bit.
    pub const TRANSMIT: u8 = 1 << 1;

    /// All events disabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bits: AtomicU8::new(0),
        }
    }

    /// Set `bits`.
    pub fn enable(&self, bits: u8) {
        self.bits.fetch_or(bits, Ordering::SeqCst);
    }

    /// Clear `bits`.
    pub fn disable(&self, bits: u8) {
        self.bits.fetch_and(!bits, Ordering::SeqCst);
    }

    /// Whether every bit in `bits` is set.
    #[must_use]
    pub fn is_enabled(&self, bits: u8) -> bool {
        self.bits.load(Ordering::SeqCst) & bits == bits
    }

    /// Whether any event is enabled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.bits.load(Ordering::SeqCst) != 0
    }
}

/// Transport over a host character device.
///
/// Device I/O errors are logged and kept for [`HostTransport::take_error`];
/// the failed byte is not retried. A failed or timed out read yields no byte.
pub struct HostTransport<D> {
    device: Mutex<D>,
    interrupt: PseudoInterrupt,
    last_error: Mutex<Option<io::Error>>,
}

impl<D: CharDevice> HostTransport<D> {
    /// Wrap an already open device.
    pub const fn new(device: D) -> Self {
        Self {
            device: Mutex::new(device),
            interrupt: PseudoInterrupt::new(),
            last_error: Mutex::new(None),
        }
    }

    /// The software interrupt register.
    pub const fn interrupt(&self) -> &PseudoInterrupt {
        &self.interrupt
    }

    /// Take the most recent device error, if any.
    pub fn take_error(&self) -> Option<io::Error> {
        self.last_error.lock().take()
    }

    /// Unwrap the device.
    pub fn into_inner(self) -> D {
        self.device.into_inner()
    }

    fn record(&self, op: &'static str, err: io::Error) {
        error!(op, error = %err, "serial device error");
        *self.last_error.lock() = Some(err);
    }
}

impl<D: CharDevice> Transport for HostTransport<D> {
    fn data_available(&self) -> bool {
        self.pending() != 0
    }

    fn ready_to_send(&self) -> bool {
        true
    }

    fn read_byte(&self) -> Option<u8> {
        let result = self.device.lock().read_byte();
        match result {
            Ok(byte) => byte,
            Err(err) => {
                self.record("read", err);
                None
            }
        }
    }

    fn write_byte(&self, byte: u8) {
        let result = self.device.lock().write_byte(byte);
        if let Err(err) = result {
            self.record("write", err);
        }
    }

    fn enable_receive_event(&self) {
        self.interrupt.enable(PseudoInterrupt::RECEIVE);
    }

    fn enable_transmit_event(&self) {
        self.interrupt.enable(PseudoInterrupt::TRANSMIT);
    }

    fn disable_transmit_event(&self) {
        self.interrupt.disable(PseudoInterrupt::TRANSMIT);
    }

    fn pending(&self) -> usize {
        let result = self.device.lock().bytes_available();
        match result {
            Ok(count) => count,
            Err(err) => {
                self.record("poll", err);
                0
            }
        }
    }
}

#[cfg(feature = "serialport")]
mod serial {
    use std::io::{self, Read, Write};
    use std::string::ToString;

    use serialport::SerialPort;
    use tracing::info;

    use super::{CharDevice, HostError, HostTransport};
    use crate::config::HostConfig;

    impl CharDevice for Box<dyn SerialPort> {
        fn bytes_available(&mut self) -> io::Result<usize> {
            let count = self.bytes_to_read()?;
            Ok(usize::try_from(count).unwrap_or(usize::MAX))
        }

        fn read_byte(&mut self) -> io::Result<Option<u8>> {
            let mut byte = [0u8; 1];
            match self.read(&mut byte) {
                Ok(0) => Ok(None),
                Ok(_) => Ok(Some(byte[0])),
                Err(err) if err.kind() == io::ErrorKind::TimedOut => Ok(None),
                Err(err) => Err(err),
            }
        }

        fn write_byte(&mut self, byte: u8) -> io::Result<()> {
            self.write_all(&[byte])
        }
    }

    impl HostTransport<Box<dyn SerialPort>> {
        /// Open the device named in `config`.
        pub fn open(config: &HostConfig) -> Result<Self, HostError> {
            config.validate()?;
            let port = serialport::new(config.device.as_str(), config.baud_rate)
                .timeout(config.read_timeout())
                .open()
                .map_err(|err| HostError::Open {
                    device: config.device.to_string(),
                    source: err.into(),
                })?;
            info!(device = %config.device, baud_rate = config.baud_rate, "serial device opened");
            Ok(Self::new(port))
        }
    }
}
