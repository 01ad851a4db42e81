// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Claimed write and read ends of a shared [`CircularBuffer`].

use core::cell::Cell;
use core::marker::PhantomData;

use super::CircularBuffer;
use crate::error::{BufferEmpty, BufferFull};

/// The single write end of a buffer.
///
/// `Send` so it can be handed to the context that produces, but not `Sync`:
/// a handle is never used from two contexts at once.
pub struct Producer<'a, T> {
    buffer: &'a CircularBuffer<T>,
    _not_sync: PhantomData<Cell<()>>,
}

impl<'a, T> Producer<'a, T> {
    pub(super) const fn new(buffer: &'a CircularBuffer<T>) -> Self {
        Self {
            buffer,
            _not_sync: PhantomData,
        }
    }

    /// Append `value`; on failure the value is handed back untouched.
    #[inline]
    pub fn write(&mut self, value: T) -> Result<(), BufferFull<T>> {
        // SAFETY: holding the claim makes this the only producer.
        unsafe { self.buffer.push(value) }
    }

    /// True when the next write would fail.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.buffer.is_full()
    }

    /// Number of elements that can still be written.
    #[inline]
    #[must_use]
    pub fn free(&self) -> usize {
        self.buffer.free()
    }
}

impl<T> Drop for Producer<'_, T> {
    fn drop(&mut self) {
        self.buffer.release_producer();
    }
}

/// The single read end of a buffer.
pub struct Consumer<'a, T> {
    buffer: &'a CircularBuffer<T>,
    _not_sync: PhantomData<Cell<()>>,
}

impl<'a, T> Consumer<'a, T> {
    pub(super) const fn new(buffer: &'a CircularBuffer<T>) -> Self {
        Self {
            buffer,
            _not_sync: PhantomData,
        }
    }

    /// Remove the oldest element.
    #[inline]
    pub fn read(&mut self) -> Result<T, BufferEmpty> {
        // SAFETY: holding the claim makes this the only consumer.
        unsafe { self.buffer.pop() }
    }

    /// True when nothing is queued.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of queued elements.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.buffer.count()
    }
}

impl<T> Drop for Consumer<'_, T> {
    fn drop(&mut self) {
        self.buffer.release_consumer();
    }
}
