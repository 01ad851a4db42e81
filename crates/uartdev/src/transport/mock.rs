// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Mock transport for testing.
//!
//! Backed by in-memory buffers so channel behaviour can be verified without
//! hardware. Event toggles are recorded so tests can check arming.

use std::collections::VecDeque;
use std::vec::Vec;

use parking_lot::Mutex;

use super::Transport;

#[derive(Default)]
struct MockState {
    /// Bytes waiting to be read.
    input: VecDeque<u8>,
    /// Bytes that were written, in order.
    output: Vec<u8>,
    /// Transmitter refuses bytes while set.
    busy: bool,
    receive_event: bool,
    transmit_event: bool,
    transmit_enables: usize,
    transmit_disables: usize,
    enable_checks: usize,
}

/// Mock transport backed by in-memory buffers.
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    /// Create an idle mock transport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
        }
    }

    /// Create a mock transport with pre-loaded input data.
    #[must_use]
    pub fn with_input(input: &[u8]) -> Self {
        let transport = Self::new();
        transport.push_input(input);
        transport
    }

    /// Add more received data.
    pub fn push_input(&self, data: &[u8]) {
        self.state.lock().input.extend(data);
    }

    /// Bytes not yet read.
    #[must_use]
    pub fn remaining_input(&self) -> usize {
        self.state.lock().input.len()
    }

    /// Everything written so far.
    #[must_use]
    pub fn output(&self) -> Vec<u8> {
        self.state.lock().output.clone()
    }

    /// Clear the output record.
    pub fn clear_output(&self) {
        self.state.lock().output.clear();
    }

    /// Make the transmitter report not ready.
    pub fn set_busy(&self, busy: bool) {
        self.state.lock().busy = busy;
    }

    /// Whether the receive event is enabled.
    #[must_use]
    pub fn receive_event_enabled(&self) -> bool {
        self.state.lock().receive_event
    }

    /// Whether the transmit event is enabled.
    #[must_use]
    pub fn transmit_event_enabled(&self) -> bool {
        self.state.lock().transmit_event
    }

    /// How often the transmit event was enabled.
    #[must_use]
    pub fn transmit_enables(&self) -> usize {
        self.state.lock().transmit_enables
    }

    /// How often the transmit event was disabled.
    #[must_use]
    pub fn transmit_disables(&self) -> usize {
        self.state.lock().transmit_disables
    }

    /// How often `ensure_enabled` was called.
    #[must_use]
    pub fn enable_checks(&self) -> usize {
        self.state.lock().enable_checks
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn data_available(&self) -> bool {
        !self.state.lock().input.is_empty()
    }

    fn ready_to_send(&self) -> bool {
        !self.state.lock().busy
    }

    fn read_byte(&self) -> Option<u8> {
        self.state.lock().input.pop_front()
    }

    fn write_byte(&self, byte: u8) {
        self.state.lock().output.push(byte);
    }

    fn enable_receive_event(&self) {
        self.state.lock().receive_event = true;
    }

    fn enable_transmit_event(&self) {
        let mut state = self.state.lock();
        state.transmit_event = true;
        state.transmit_enables += 1;
    }

    fn disable_transmit_event(&self) {
        let mut state = self.state.lock();
        state.transmit_event = false;
        state.transmit_disables += 1;
    }

    fn pending(&self) -> usize {
        self.state.lock().input.len()
    }

    fn ensure_enabled(&self) {
        self.state.lock().enable_checks += 1;
    }
}
