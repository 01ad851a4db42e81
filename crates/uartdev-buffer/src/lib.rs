// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Resizable circular queue shared between an interrupt and the foreground.
//!
//! A [`CircularBuffer`] is the single point of data exchange between the
//! two execution contexts of a serial channel: the foreground caller and the
//! bottom-half handler (an interrupt service routine, or a polling thread on
//! hosts without real interrupts).
//!
//! # Concurrency model
//!
//! The buffer takes no lock. Exactly one context may write and exactly one
//! context may read at any time:
//! - With exclusive access (`&mut self`) use [`CircularBuffer::write`] and
//!   [`CircularBuffer::read`] directly.
//! - With shared access (`&self`) claim the write end with
//!   [`CircularBuffer::producer`] and the read end with
//!   [`CircularBuffer::consumer`]. A second claim of the same end while the
//!   first handle is alive returns `None`.
//!
//! Resizing needs `&mut self`, so it can never race with an outstanding
//! endpoint handle.
//!
//! # Full/empty disambiguation
//!
//! One slot is always left unused: the buffer is empty when both indices are
//! equal and full when advancing the write index would reach the read index.
//! A buffer created with capacity `n` holds at most `n - 1` elements.
//!
//! # Example
//!
//! ```
//! use uartdev_buffer::{BufferFull, CircularBuffer};
//!
//! let mut buffer = CircularBuffer::with_capacity(4).unwrap();
//! buffer.write(0x01).unwrap();
//! buffer.write(0x02).unwrap();
//! buffer.write(0x03).unwrap();
//! assert_eq!(buffer.write(0x04), Err(BufferFull(0x04)));
//! assert_eq!(buffer.read(), Ok(0x01));
//! ```
//!
//! # Targets without native atomics
//!
//! Enable one of the `portable-atomic*` features to take the index atomics
//! from `portable-atomic`.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod atomic;
pub mod circular;
pub mod error;

pub use circular::{CircularBuffer, Consumer, DEFAULT_CAPACITY, Producer, ResizeOutcome};
pub use error::{BufferEmpty, BufferFull, InvalidCapacity};
