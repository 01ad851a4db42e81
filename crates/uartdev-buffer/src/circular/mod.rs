// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Fixed-capacity, resizable SPSC circular buffer.
//!
//! # Memory ordering
//!
//! The producer stores the value into its slot and then publishes the new
//! write index with `Release`. The consumer loads the write index with
//! `Acquire` before touching the slot, takes the value out and publishes the
//! new read index with `Release`, which the producer in turn loads with
//! `Acquire` before reusing the slot. Index stores are the last visible side
//! effect of every operation.

#[cfg(test)]
mod circular_test;
mod split;

use alloc::boxed::Box;
use core::cell::UnsafeCell;
use core::fmt;
use core::mem::MaybeUninit;

use tracing::{debug, warn};

use crate::atomic::{AtomicBool, AtomicUsize, Ordering};
use crate::error::{BufferEmpty, BufferFull, InvalidCapacity};

pub use split::{Consumer, Producer};

/// Capacity used when none is given.
pub const DEFAULT_CAPACITY: usize = 128;

type Slots<T> = Box<[UnsafeCell<MaybeUninit<T>>]>;

/// Result of a [`CircularBuffer::resize`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOutcome {
    /// Elements carried over into the new storage, oldest first.
    pub retained: usize,
    /// Oldest elements discarded because the new capacity was too small.
    pub dropped: usize,
}

impl ResizeOutcome {
    /// True when queued elements were lost.
    #[inline]
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.dropped != 0
    }
}

/// Single-producer/single-consumer circular queue.
///
/// Usable capacity is `capacity() - 1`; see the crate documentation.
pub struct CircularBuffer<T> {
    slots: Slots<T>,
    /// Next slot the producer fills. Only the producer stores to it.
    write_index: AtomicUsize,
    /// Next slot the consumer empties. Only the consumer stores to it.
    read_index: AtomicUsize,
    producer_claimed: AtomicBool,
    consumer_claimed: AtomicBool,
}

// SAFETY: A slot is only touched by the producer before it publishes the
// write index and by the consumer after it observes that index; the claim
// flags guarantee at most one producer and one consumer through `&self`.
unsafe impl<T: Send> Sync for CircularBuffer<T> {}

impl<T> CircularBuffer<T> {
    /// Create a buffer with [`DEFAULT_CAPACITY`] slots.
    #[must_use]
    pub fn new() -> Self {
        Self::from_slots(Self::allocate(DEFAULT_CAPACITY))
    }

    /// Create a buffer with `capacity` slots.
    ///
    /// Fails before allocating when `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, InvalidCapacity> {
        if capacity == 0 {
            return Err(InvalidCapacity);
        }
        Ok(Self::from_slots(Self::allocate(capacity)))
    }

    fn allocate(capacity: usize) -> Slots<T> {
        (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect()
    }

    fn from_slots(slots: Slots<T>) -> Self {
        Self {
            slots,
            write_index: AtomicUsize::new(0),
            read_index: AtomicUsize::new(0),
            producer_claimed: AtomicBool::new(false),
            consumer_claimed: AtomicBool::new(false),
        }
    }

    /// Number of allocated slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Maximum number of elements that can be queued at once.
    #[inline]
    #[must_use]
    pub fn usable_capacity(&self) -> usize {
        self.capacity() - 1
    }

    /// Number of queued elements.
    ///
    /// Called from a third context this is only a snapshot.
    #[must_use]
    pub fn count(&self) -> usize {
        let read = self.read_index.load(Ordering::Acquire);
        let write = self.write_index.load(Ordering::Acquire);
        if write >= read {
            write - read
        } else {
            self.capacity() - read + write
        }
    }

    /// Number of elements that can still be written.
    #[inline]
    #[must_use]
    pub fn free(&self) -> usize {
        self.usable_capacity() - self.count()
    }

    /// True when no element is queued.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_index.load(Ordering::Acquire) == self.write_index.load(Ordering::Acquire)
    }

    /// True when the next write would fail.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        let write = self.write_index.load(Ordering::Acquire);
        self.advance(write) == self.read_index.load(Ordering::Acquire)
    }

    #[inline]
    fn advance(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.capacity() { 0 } else { next }
    }

    /// Append `value` at the write index.
    pub fn write(&mut self, value: T) -> Result<(), BufferFull<T>> {
        // SAFETY: `&mut self` excludes every other producer and consumer.
        unsafe { self.push(value) }
    }

    /// Remove the element at the read index.
    pub fn read(&mut self) -> Result<T, BufferEmpty> {
        // SAFETY: `&mut self` excludes every other producer and consumer.
        unsafe { self.pop() }
    }

    /// Claim the write end for use through a shared reference.
    ///
    /// Returns `None` while another [`Producer`] is alive.
    #[must_use]
    pub fn producer(&self) -> Option<Producer<'_, T>> {
        if self.producer_claimed.swap(true, Ordering::Acquire) {
            None
        } else {
            Some(Producer::new(self))
        }
    }

    /// Claim the read end for use through a shared reference.
    ///
    /// Returns `None` while another [`Consumer`] is alive.
    #[must_use]
    pub fn consumer(&self) -> Option<Consumer<'_, T>> {
        if self.consumer_claimed.swap(true, Ordering::Acquire) {
            None
        } else {
            Some(Consumer::new(self))
        }
    }

    pub(crate) fn release_producer(&self) {
        self.producer_claimed.store(false, Ordering::Release);
    }

    pub(crate) fn release_consumer(&self) {
        self.consumer_claimed.store(false, Ordering::Release);
    }

    /// # Safety
    ///
    /// The caller must be the only producer for the duration of the call.
    pub(crate) unsafe fn push(&self, value: T) -> Result<(), BufferFull<T>> {
        let write = self.write_index.load(Ordering::Relaxed);
        let next = self.advance(write);
        if next == self.read_index.load(Ordering::Acquire) {
            return Err(BufferFull(value));
        }

        // SAFETY: the slot at `write` is outside the consumer's window until
        // the store below publishes it.
        unsafe { (*self.slots[write].get()).write(value) };
        self.write_index.store(next, Ordering::Release);
        Ok(())
    }

    /// # Safety
    ///
    /// The caller must be the only consumer for the duration of the call.
    pub(crate) unsafe fn pop(&self) -> Result<T, BufferEmpty> {
        let read = self.read_index.load(Ordering::Relaxed);
        if read == self.write_index.load(Ordering::Acquire) {
            return Err(BufferEmpty);
        }

        // SAFETY: the producer initialised this slot before publishing the
        // write index observed above, and will not reuse it until the read
        // index moves past it.
        let value = unsafe { (*self.slots[read].get()).assume_init_read() };
        self.read_index.store(self.advance(read), Ordering::Release);
        Ok(value)
    }

    /// Reallocate the backing storage with `new_capacity` slots.
    ///
    /// Queued elements are moved to the front of the new storage in FIFO
    /// order. When they do not fit, the oldest are dropped and the newest
    /// `new_capacity - 1` are kept; this is reported in the outcome, not as
    /// an error.
    pub fn resize(&mut self, new_capacity: usize) -> Result<ResizeOutcome, InvalidCapacity> {
        if new_capacity == 0 {
            return Err(InvalidCapacity);
        }

        let old_capacity = self.capacity();
        let occupancy = self.count();
        let keep = occupancy.min(new_capacity - 1);

        let mut dropped = 0;
        while dropped < occupancy - keep && self.read().is_ok() {
            dropped += 1;
        }

        let mut slots = Self::allocate(new_capacity);
        let mut retained = 0;
        for slot in slots.iter_mut().take(keep) {
            let Ok(value) = self.read() else { break };
            slot.get_mut().write(value);
            retained += 1;
        }

        self.slots = slots;
        *self.read_index.get_mut() = 0;
        *self.write_index.get_mut() = retained;

        if dropped != 0 {
            warn!(
                old_capacity,
                new_capacity, dropped, retained, "circular buffer shrunk below occupancy"
            );
        } else {
            debug!(old_capacity, new_capacity, retained, "circular buffer resized");
        }

        Ok(ResizeOutcome { retained, dropped })
    }
}

impl<T> Default for CircularBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for CircularBuffer<T> {
    fn drop(&mut self) {
        while self.read().is_ok() {}
    }
}

impl<T> fmt::Debug for CircularBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircularBuffer")
            .field("capacity", &self.capacity())
            .field("count", &self.count())
            .field("read_index", &self.read_index.load(Ordering::Relaxed))
            .field("write_index", &self.write_index.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
