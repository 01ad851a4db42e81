// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the circular buffer.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::rc::Rc;
use std::vec::Vec;

use proptest::prelude::*;

use super::*;

fn filled(capacity: usize, values: &[u8]) -> CircularBuffer<u8> {
    let mut buffer = CircularBuffer::with_capacity(capacity).unwrap();
    for &value in values {
        buffer.write(value).unwrap();
    }
    buffer
}

fn drain(buffer: &mut CircularBuffer<u8>) -> Vec<u8> {
    let mut out = Vec::new();
    while let Ok(value) = buffer.read() {
        out.push(value);
    }
    out
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn new_uses_default_capacity() {
    let buffer = CircularBuffer::<u8>::new();
    assert_eq!(buffer.capacity(), DEFAULT_CAPACITY);
    assert_eq!(buffer.usable_capacity(), DEFAULT_CAPACITY - 1);
    assert!(buffer.is_empty());
    assert!(!buffer.is_full());
    assert_eq!(buffer.count(), 0);
}

#[test]
fn zero_capacity_is_rejected() {
    assert_eq!(
        CircularBuffer::<u8>::with_capacity(0).unwrap_err(),
        InvalidCapacity
    );
}

#[test]
fn capacity_one_is_always_full() {
    let mut buffer = CircularBuffer::<u8>::with_capacity(1).unwrap();
    assert!(buffer.is_empty());
    assert!(buffer.is_full());
    assert_eq!(buffer.write(7u8), Err(BufferFull(7)));
}

// =============================================================================
// Read / write
// =============================================================================

#[test]
fn capacity_four_scenario_reserves_one_slot() {
    let mut buffer = filled(4, &[0x01, 0x02, 0x03]);
    assert_eq!(buffer.count(), 3);
    assert!(buffer.is_full());

    assert_eq!(buffer.read(), Ok(0x01));
    assert_eq!(buffer.count(), 2);

    assert_eq!(buffer.write(0x04), Ok(()));
    assert_eq!(buffer.write(0x05), Err(BufferFull(0x05)));
    assert_eq!(buffer.count(), 3);

    assert_eq!(drain(&mut buffer), [0x02, 0x03, 0x04]);
}

#[test]
fn write_past_usable_capacity_fails_without_state_change() {
    let mut buffer = filled(8, &[1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(buffer.free(), 0);

    let err = buffer.write(8).unwrap_err();
    assert_eq!(err.into_inner(), 8);
    assert_eq!(buffer.count(), 7);
    assert_eq!(drain(&mut buffer), [1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn read_on_empty_fails_without_state_change() {
    let mut buffer = filled(4, &[9]);
    assert_eq!(buffer.read(), Ok(9));
    assert_eq!(buffer.read(), Err(BufferEmpty));
    assert_eq!(buffer.read(), Err(BufferEmpty));
    assert_eq!(buffer.count(), 0);

    buffer.write(10).unwrap();
    assert_eq!(buffer.read(), Ok(10));
}

#[test]
fn indices_wrap_around() {
    let mut buffer = CircularBuffer::with_capacity(3).unwrap();
    for round in 0..10u8 {
        buffer.write(round).unwrap();
        buffer.write(round.wrapping_add(100)).unwrap();
        assert_eq!(buffer.count(), 2);
        assert_eq!(buffer.read(), Ok(round));
        assert_eq!(buffer.read(), Ok(round.wrapping_add(100)));
    }
    assert!(buffer.is_empty());
}

#[test]
fn queued_values_are_dropped_with_the_buffer() {
    let marker = Rc::new(());
    {
        let mut buffer = CircularBuffer::with_capacity(8).unwrap();
        for _ in 0..5 {
            buffer.write(Rc::clone(&marker)).unwrap();
        }
        drop(buffer.read().unwrap());
        assert_eq!(Rc::strong_count(&marker), 5);
    }
    assert_eq!(Rc::strong_count(&marker), 1);
}

// =============================================================================
// Resize
// =============================================================================

#[test]
fn resize_to_zero_is_rejected_and_keeps_contents() {
    let mut buffer = filled(4, &[1, 2]);
    assert_eq!(buffer.resize(0), Err(InvalidCapacity));
    assert_eq!(buffer.capacity(), 4);
    assert_eq!(drain(&mut buffer), [1, 2]);
}

#[test]
fn grow_preserves_order_across_wrap() {
    let mut buffer = filled(4, &[1, 2, 3]);
    assert_eq!(buffer.read(), Ok(1));
    assert_eq!(buffer.read(), Ok(2));
    buffer.write(4).unwrap();
    buffer.write(5).unwrap();

    let outcome = buffer.resize(16).unwrap();
    assert_eq!(
        outcome,
        ResizeOutcome {
            retained: 3,
            dropped: 0
        }
    );
    assert!(!outcome.is_truncated());
    assert_eq!(buffer.capacity(), 16);
    assert_eq!(buffer.count(), 3);

    buffer.write(6).unwrap();
    assert_eq!(drain(&mut buffer), [3, 4, 5, 6]);
}

#[test]
fn shrink_below_occupancy_keeps_newest() {
    let mut buffer = filled(16, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);

    let outcome = buffer.resize(4).unwrap();
    assert!(outcome.is_truncated());
    assert_eq!(outcome.retained, 3);
    assert_eq!(outcome.dropped, 7);
    assert!(buffer.is_full());
    assert_eq!(drain(&mut buffer), [8, 9, 10]);
}

#[test]
fn shrink_to_one_drops_everything() {
    let mut buffer = filled(8, &[1, 2, 3]);
    let outcome = buffer.resize(1).unwrap();
    assert_eq!(
        outcome,
        ResizeOutcome {
            retained: 0,
            dropped: 3
        }
    );
    assert!(buffer.is_empty());
}

#[test]
fn resize_drops_discarded_values() {
    let marker = Rc::new(());
    let mut buffer = CircularBuffer::with_capacity(8).unwrap();
    for _ in 0..6 {
        buffer.write(Rc::clone(&marker)).unwrap();
    }
    let outcome = buffer.resize(3).unwrap();
    assert_eq!(outcome.dropped, 4);
    assert_eq!(Rc::strong_count(&marker), 3);
}

// =============================================================================
// Laws
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    Write(u8),
    Read,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![any::<u8>().prop_map(Op::Write), Just(Op::Read)]
}

proptest! {
    #[test]
    fn fifo_law(capacity in 1usize..32, ops in proptest::collection::vec(op_strategy(), 0..200)) {
        let mut buffer = CircularBuffer::with_capacity(capacity).unwrap();
        let mut model = std::collections::VecDeque::new();

        for op in ops {
            match op {
                Op::Write(value) => {
                    let accepted = buffer.write(value).is_ok();
                    prop_assert_eq!(accepted, model.len() < capacity - 1);
                    if accepted {
                        model.push_back(value);
                    }
                }
                Op::Read => {
                    prop_assert_eq!(buffer.read().ok(), model.pop_front());
                }
            }
            prop_assert_eq!(buffer.count(), model.len());
            prop_assert_eq!(buffer.is_empty(), model.is_empty());
            prop_assert_eq!(buffer.is_full(), model.len() == capacity - 1);
        }
    }

    #[test]
    fn resize_keeps_newest_in_order(
        values in proptest::collection::vec(any::<u8>(), 0..64),
        new_capacity in 1usize..80,
    ) {
        let mut buffer = CircularBuffer::with_capacity(65).unwrap();
        for &value in &values {
            buffer.write(value).unwrap();
        }

        let outcome = buffer.resize(new_capacity).unwrap();
        let keep = values.len().min(new_capacity - 1);
        prop_assert_eq!(outcome.retained, keep);
        prop_assert_eq!(outcome.dropped, values.len() - keep);
        prop_assert_eq!(drain(&mut buffer), values[values.len() - keep..].to_vec());
    }
}
