// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Buffer error types.
//!
//! `BufferFull` and `BufferEmpty` are control-flow signals rather than
//! failures: an empty outbound buffer is how the bottom half learns that a
//! transmit burst is over.

use core::fmt;

/// The buffer had no free slot; the rejected value is handed back.
///
/// Buffer state is unchanged. Dropping the value is the caller's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferFull<T>(pub T);

impl<T> BufferFull<T> {
    /// Take back the value that could not be queued.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for BufferFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer full")
    }
}

impl<T: fmt::Debug> core::error::Error for BufferFull<T> {}

/// The buffer held no element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("buffer empty")]
pub struct BufferEmpty;

/// A capacity of zero was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid buffer capacity: must be at least 1")]
pub struct InvalidCapacity;
