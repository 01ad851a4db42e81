// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! In-memory character device.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::vec::Vec;

use parking_lot::Mutex;

use super::CharDevice;

#[derive(Default)]
struct Wire {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
    fail_writes: bool,
}

/// Device with separate in-memory input and output queues.
///
/// Clones share the same wire, so a test keeps one clone to feed input and
/// inspect output while the transport owns another.
#[derive(Clone, Default)]
pub struct MemoryDevice {
    wire: Arc<Mutex<Wire>>,
}

impl MemoryDevice {
    /// An idle device.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `data` available for reading.
    pub fn push_input(&self, data: &[u8]) {
        self.wire.lock().inbound.extend(data);
    }

    /// Take everything written so far.
    #[must_use]
    pub fn take_output(&self) -> Vec<u8> {
        core::mem::take(&mut self.wire.lock().outbound)
    }

    /// Bytes written so far, without taking them.
    #[must_use]
    pub fn output_len(&self) -> usize {
        self.wire.lock().outbound.len()
    }

    /// Make writes fail with `BrokenPipe`.
    pub fn fail_writes(&self, fail: bool) {
        self.wire.lock().fail_writes = fail;
    }
}

impl CharDevice for MemoryDevice {
    fn bytes_available(&mut self) -> io::Result<usize> {
        Ok(self.wire.lock().inbound.len())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.wire.lock().inbound.pop_front())
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        let mut wire = self.wire.lock();
        if wire.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device gone"));
        }
        wire.outbound.push(byte);
        Ok(())
    }
}
