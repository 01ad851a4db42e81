// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Serial channel: buffered, interrupt-driven transfer over a [`Transport`].
//!
//! # Execution contexts
//!
//! The foreground calls the blocking primitives, [`SerialChannel::enqueue_byte`]
//! and [`SerialChannel::dequeue_byte`]. The bottom half
//! ([`SerialChannel::bottom_half`]) runs from the UART interrupt, or from a
//! polling thread on hosts without one. The two contexts share the channel
//! by reference and never take a lock:
//!
//! | Buffer   | Writer                  | Reader                  |
//! |----------|-------------------------|-------------------------|
//! | inbound  | bottom half             | foreground (`dequeue`)  |
//! | outbound | foreground (`enqueue`)  | bottom half             |
//!
//! Foreground calls claim their buffer end for the duration of the call and
//! spin if another foreground thread holds it. The bottom half never spins:
//! if its end is already claimed it skips that step and returns.
//!
//! # Transmit arming
//!
//! `transmit_armed` is set by every enqueue and cleared by the bottom half as
//! soon as it observes the outbound buffer empty. After clearing it the
//! bottom half looks at the buffer once more and re-arms if an enqueue raced
//! in, so no byte is left behind with transmission disarmed.


use core::hint;

use tracing::{debug, trace, warn};
use uartdev_buffer::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering, fence};
use uartdev_buffer::{BufferEmpty, BufferFull, CircularBuffer, InvalidCapacity, ResizeOutcome};

use crate::config::ChannelConfig;
use crate::error::DataError;
use crate::transport::Transport;

/// Outcome of the most recent transmit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultState {
    /// No transmit has been requested yet.
    Initialised = 0,
    /// The last transmit completed.
    NoFault = 1,
    /// The last transmit was rejected for lack of data.
    DataError = 2,
}

impl FaultState {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::NoFault,
            2 => Self::DataError,
            _ => Self::Initialised,
        }
    }
}

/// Work done by one [`SerialChannel::bottom_half`] invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Serviced {
    /// Bytes moved from the transport into the inbound buffer. Bytes dropped
    /// as overruns are counted by [`SerialChannel::rx_overruns`] instead.
    pub received: usize,
    /// Bytes moved from the outbound buffer onto the transport (0 or 1).
    pub transmitted: usize,
}

/// Both buffers' results of [`SerialChannel::resize_buffers`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferResize {
    /// Inbound buffer outcome.
    pub inbound: ResizeOutcome,
    /// Outbound buffer outcome.
    pub outbound: ResizeOutcome,
}

/// A UART with inbound and outbound circular buffers.
pub struct SerialChannel<T> {
    transport: T,
    inbound: CircularBuffer<u8>,
    outbound: CircularBuffer<u8>,
    fault: AtomicU8,
    receive_armed: AtomicBool,
    transmit_armed: AtomicBool,
    rx_overruns: AtomicUsize,
    tx_overflows: AtomicUsize,
}

impl<T: Transport> SerialChannel<T> {
    /// Create a channel with buffers of the default capacity (128).
    pub fn new(transport: T) -> Self {
        Self::from_buffers(transport, CircularBuffer::new(), CircularBuffer::new())
    }

    /// Create a channel whose buffers have `capacity` slots each.
    pub fn with_capacity(transport: T, capacity: usize) -> Result<Self, InvalidCapacity> {
        let inbound = CircularBuffer::with_capacity(capacity)?;
        let outbound = CircularBuffer::with_capacity(capacity)?;
        Ok(Self::from_buffers(transport, inbound, outbound))
    }

    /// Create a channel from a [`ChannelConfig`].
    pub fn from_config(transport: T, config: &ChannelConfig) -> Result<Self, InvalidCapacity> {
        config.validate()?;
        Self::with_capacity(transport, config.capacity)
    }

    fn from_buffers(
        transport: T,
        inbound: CircularBuffer<u8>,
        outbound: CircularBuffer<u8>,
    ) -> Self {
        debug!(capacity = inbound.capacity(), "serial channel created");
        Self {
            transport,
            inbound,
            outbound,
            fault: AtomicU8::new(FaultState::Initialised as u8),
            receive_armed: AtomicBool::new(false),
            transmit_armed: AtomicBool::new(false),
            rx_overruns: AtomicUsize::new(0),
            tx_overflows: AtomicUsize::new(0),
        }
    }

    /// The underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Outcome of the most recent transmit request.
    pub fn fault_state(&self) -> FaultState {
        FaultState::from_raw(self.fault.load(Ordering::Acquire))
    }

    fn set_fault(&self, state: FaultState) {
        self.fault.store(state as u8, Ordering::Release);
    }

    /// Whether the bottom half copies received bytes into the inbound buffer.
    pub fn receive_armed(&self) -> bool {
        self.receive_armed.load(Ordering::Acquire)
    }

    /// Whether the bottom half drains the outbound buffer.
    pub fn transmit_armed(&self) -> bool {
        self.transmit_armed.load(Ordering::Acquire)
    }

    /// Received bytes dropped because the inbound buffer was full.
    pub fn rx_overruns(&self) -> usize {
        self.rx_overruns.load(Ordering::Relaxed)
    }

    /// Bytes rejected by enqueue because the outbound buffer was full.
    pub fn tx_overflows(&self) -> usize {
        self.tx_overflows.load(Ordering::Relaxed)
    }

    /// Slots per buffer.
    pub fn capacity(&self) -> usize {
        self.inbound.capacity()
    }

    /// Bytes waiting in the inbound buffer.
    pub fn inbound_count(&self) -> usize {
        self.inbound.count()
    }

    /// Bytes waiting in the outbound buffer.
    pub fn outbound_count(&self) -> usize {
        self.outbound.count()
    }

    // =========================================================================
    // Blocking primitives
    // =========================================================================

    /// Wait for a received byte and return it straight from the transport.
    ///
    /// Bypasses the inbound buffer. Spins without timeout, including past
    /// reads that come back empty.
    pub fn blocking_read_byte(&self) -> u8 {
        self.transport.ensure_enabled();
        loop {
            while !self.transport.data_available() {
                hint::spin_loop();
            }
            if let Some(byte) = self.transport.read_byte() {
                return byte;
            }
        }
    }

    /// Wait until the transmitter is ready, then write `byte` to it.
    ///
    /// Spins without timeout.
    pub fn blocking_write_byte(&self, byte: u8) {
        self.transport.ensure_enabled();
        self.spin_write(byte);
    }

    fn spin_write(&self, byte: u8) {
        while !self.transport.ready_to_send() {
            hint::spin_loop();
        }
        self.transport.write_byte(byte);
    }

    /// Write every byte of `bytes` in order, waiting for the transmitter.
    ///
    /// An empty payload is rejected before the transport is touched and
    /// recorded as [`FaultState::DataError`]. Once started, the transfer runs
    /// to completion.
    pub fn blocking_write(&self, bytes: &[u8]) -> Result<(), DataError> {
        if bytes.is_empty() {
            self.set_fault(FaultState::DataError);
            warn!("transmit rejected: empty payload");
            return Err(DataError);
        }

        self.transport.ensure_enabled();
        for &byte in bytes {
            self.spin_write(byte);
        }

        self.set_fault(FaultState::NoFault);
        Ok(())
    }

    // =========================================================================
    // Interrupt-driven primitives
    // =========================================================================

    fn claim<E>(acquire: impl Fn() -> Option<E>) -> E {
        loop {
            if let Some(end) = acquire() {
                return end;
            }
            hint::spin_loop();
        }
    }

    /// Queue `byte` for the bottom half and arm transmission.
    ///
    /// When the outbound buffer is full the byte is handed back; transmission
    /// is armed either way so the buffer keeps draining.
    pub fn enqueue_byte(&self, byte: u8) -> Result<(), BufferFull<u8>> {
        let result = Self::claim(|| self.outbound.producer()).write(byte);
        if result.is_err() {
            self.tx_overflows.fetch_add(1, Ordering::Relaxed);
        }
        fence(Ordering::SeqCst);
        self.arm_transmit();
        result
    }

    /// Queue as many of `bytes` as fit and arm transmission.
    ///
    /// Stops at the first byte that does not fit and returns how many were
    /// queued.
    pub fn enqueue(&self, bytes: &[u8]) -> usize {
        if bytes.is_empty() {
            return 0;
        }

        let mut queued = 0;
        {
            let mut producer = Self::claim(|| self.outbound.producer());
            for &byte in bytes {
                if producer.write(byte).is_err() {
                    break;
                }
                queued += 1;
            }
        }

        let rejected = bytes.len() - queued;
        if rejected != 0 {
            self.tx_overflows.fetch_add(rejected, Ordering::Relaxed);
        }
        fence(Ordering::SeqCst);
        self.arm_transmit();
        queued
    }

    /// Take the oldest received byte from the inbound buffer.
    ///
    /// Never touches the transport.
    pub fn dequeue_byte(&self) -> Result<u8, BufferEmpty> {
        Self::claim(|| self.inbound.consumer()).read()
    }

    /// Move received bytes into `buf`; returns how many were copied.
    pub fn dequeue_into(&self, buf: &mut [u8]) -> usize {
        let mut consumer = Self::claim(|| self.inbound.consumer());
        let mut copied = 0;
        for slot in buf.iter_mut() {
            let Ok(byte) = consumer.read() else { break };
            *slot = byte;
            copied += 1;
        }
        copied
    }

    /// Resize both buffers to `new_capacity` slots.
    ///
    /// Needs exclusive access, so it cannot overlap the bottom half. Each
    /// buffer keeps its newest bytes independently if shrunk below its
    /// occupancy. A zero capacity is rejected before either buffer changes.
    pub fn resize_buffers(&mut self, new_capacity: usize) -> Result<BufferResize, InvalidCapacity> {
        if new_capacity == 0 {
            return Err(InvalidCapacity);
        }

        let inbound = self.inbound.resize(new_capacity)?;
        let outbound = self.outbound.resize(new_capacity)?;
        debug!(
            new_capacity,
            inbound_dropped = inbound.dropped,
            outbound_dropped = outbound.dropped,
            "channel buffers resized"
        );
        Ok(BufferResize { inbound, outbound })
    }

    /// Let the bottom half copy received bytes into the inbound buffer.
    pub fn arm_receive(&self) {
        self.receive_armed.store(true, Ordering::SeqCst);
        self.transport.enable_receive_event();
        trace!("receive armed");
    }

    /// Let the bottom half drain the outbound buffer.
    pub fn arm_transmit(&self) {
        self.transmit_armed.store(true, Ordering::SeqCst);
        self.transport.enable_transmit_event();
        trace!("transmit armed");
    }

    /// Stop the bottom half from draining the outbound buffer.
    ///
    /// Bytes already queued stay queued until transmission is armed again.
    pub fn disarm_transmit(&self) {
        self.transport.disable_transmit_event();
        self.transmit_armed.store(false, Ordering::SeqCst);
        trace!("transmit disarmed");
    }

    // =========================================================================
    // Bottom half
    // =========================================================================

    /// Service one notification event.
    ///
    /// Copies available received bytes into the inbound buffer when receive
    /// is armed, and moves at most one byte from the outbound buffer to the
    /// transport when transmit is armed. Never blocks.
    pub fn bottom_half(&self) -> Serviced {
        let mut serviced = Serviced::default();
        if self.receive_armed.load(Ordering::Acquire) {
            serviced.received = self.service_receive();
        }
        if self.transmit_armed.load(Ordering::Acquire) {
            serviced.transmitted = self.service_transmit();
        }
        serviced
    }

    fn service_receive(&self) -> usize {
        if !self.transport.data_available() {
            return 0;
        }
        let Some(mut producer) = self.inbound.producer() else {
            return 0;
        };

        let pending = self.transport.pending().max(1);
        let mut received = 0;
        for _ in 0..pending {
            let Some(byte) = self.transport.read_byte() else {
                break;
            };
            if producer.write(byte).is_ok() {
                received += 1;
            } else {
                self.rx_overruns.fetch_add(1, Ordering::Relaxed);
                warn!(byte, "inbound buffer full, received byte dropped");
            }
        }
        received
    }

    fn service_transmit(&self) -> usize {
        let Some(mut consumer) = self.outbound.consumer() else {
            return 0;
        };

        if consumer.is_empty() {
            self.settle_transmit();
            return 0;
        }
        if !self.transport.ready_to_send() {
            return 0;
        }

        match consumer.read() {
            Ok(byte) => {
                self.transport.write_byte(byte);
                if consumer.is_empty() {
                    self.settle_transmit();
                }
                1
            }
            Err(BufferEmpty) => {
                self.settle_transmit();
                0
            }
        }
    }

    fn settle_transmit(&self) {
        self.disarm_transmit();
        fence(Ordering::SeqCst);
        if !self.outbound.is_empty() {
            self.arm_transmit();
        }
    }
}

impl<T> core::fmt::Debug for SerialChannel<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("fault", &FaultState::from_raw(self.fault.load(Ordering::Relaxed)))
            .field("receive_armed", &self.receive_armed.load(Ordering::Relaxed))
            .field("transmit_armed", &self.transmit_armed.load(Ordering::Relaxed))
            .field("inbound", &self.inbound)
            .field("outbound", &self.outbound)
            .finish_non_exhaustive()
    }
}
