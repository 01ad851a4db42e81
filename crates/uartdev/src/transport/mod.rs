// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Transport capability consumed by the serial channel.
//!
//! A transport is the physical or OS-level byte channel under a
//! [`SerialChannel`](crate::SerialChannel): a memory-mapped register bank on
//! microcontrollers, or a character device on a general-purpose host. The
//! backend is chosen by constructing the channel with one transport value or
//! another; nothing is selected at compile time.
//!
//! Every method takes `&self` because the foreground and the bottom half
//! both reach the transport through a shared channel.

#[cfg(feature = "std")]
pub mod host;
#[cfg(any(test, feature = "std"))]
mod mock;
mod register;
#[cfg(test)]
mod register_test;

#[cfg(any(test, feature = "std"))]
pub use mock::MockTransport;
pub use register::{PL011, RegisterMap, RegisterTransport, STM32F4_USART, StatusFlag};

/// Byte-level transport plus the notification controls of one UART.
pub trait Transport {
    /// Whether a received byte can be read now.
    fn data_available(&self) -> bool;

    /// Whether a byte can be handed to the transmitter now.
    fn ready_to_send(&self) -> bool;

    /// Read one byte. The caller has already checked [`data_available`].
    ///
    /// `None` when no byte could be read after all (a timed out or failed
    /// device read); nothing is consumed from the inbound stream then.
    ///
    /// [`data_available`]: Transport::data_available
    fn read_byte(&self) -> Option<u8>;

    /// Write one byte. The caller has already checked [`ready_to_send`].
    ///
    /// [`ready_to_send`]: Transport::ready_to_send
    fn write_byte(&self, byte: u8);

    /// Let receive events trigger the bottom half.
    fn enable_receive_event(&self);

    /// Let transmit-ready events trigger the bottom half.
    fn enable_transmit_event(&self);

    /// Stop transmit-ready events from triggering the bottom half.
    fn disable_transmit_event(&self);

    /// Bytes the bottom half may drain in one pass.
    ///
    /// Register banks deliver one byte per interrupt; host devices report
    /// however many bytes the driver has buffered.
    fn pending(&self) -> usize {
        usize::from(self.data_available())
    }

    /// Switch the peripheral on if it was left disabled.
    fn ensure_enabled(&self) {}
}
