// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the register-mapped transport, run against ordinary memory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::boxed::Box;

use super::{PL011, RegisterMap, RegisterTransport, STM32F4_USART, StatusFlag, Transport};

const BANK_WORDS: usize = 32;

/// Heap memory standing in for a device register bank.
struct FakeBank {
    base: *mut u32,
}

impl FakeBank {
    fn new() -> Self {
        let bank = Box::new([0u32; BANK_WORDS]);
        Self {
            base: Box::into_raw(bank).cast::<u32>(),
        }
    }

    fn transport(&self, map: &'static RegisterMap) -> RegisterTransport {
        // SAFETY: the bank outlives every transport created in these tests.
        unsafe { RegisterTransport::new(self.base, map) }
    }

    fn get(&self, offset: usize) -> u32 {
        // SAFETY: offset is within the bank.
        unsafe { self.base.add(offset / 4).read_volatile() }
    }

    fn set(&self, offset: usize, value: u32) {
        // SAFETY: offset is within the bank.
        unsafe { self.base.add(offset / 4).write_volatile(value) }
    }
}

impl Drop for FakeBank {
    fn drop(&mut self) {
        // SAFETY: `base` came from `Box::into_raw` of the same array type.
        drop(unsafe { Box::from_raw(self.base.cast::<[u32; BANK_WORDS]>()) });
    }
}

#[test]
fn status_flag_polarity() {
    assert!(StatusFlag::high(0b100).holds(0b100));
    assert!(!StatusFlag::high(0b100).holds(0b011));
    assert!(StatusFlag::low(0b100).holds(0b011));
    assert!(!StatusFlag::low(0b100).holds(0b100));
}

#[test]
fn stm32_status_flags() {
    let bank = FakeBank::new();
    let uart = bank.transport(&STM32F4_USART);

    assert!(!uart.data_available());
    assert!(!uart.ready_to_send());

    bank.set(0x00, (1 << 5) | (1 << 7));
    assert!(uart.data_available());
    assert!(uart.ready_to_send());
    assert_eq!(uart.pending(), 1);
}

#[test]
fn stm32_data_register_transfers() {
    let bank = FakeBank::new();
    let uart = bank.transport(&STM32F4_USART);

    bank.set(0x04, 0x1_41);
    assert_eq!(uart.read_byte(), Some(0x41));

    uart.write_byte(0x5A);
    assert_eq!(bank.get(0x04), 0x5A);
}

#[test]
fn stm32_interrupt_enable_bits() {
    let bank = FakeBank::new();
    let uart = bank.transport(&STM32F4_USART);
    bank.set(0x0C, 1 << 13);

    uart.enable_receive_event();
    uart.enable_transmit_event();
    assert_eq!(bank.get(0x0C), (1 << 13) | (1 << 7) | (1 << 5));

    uart.disable_transmit_event();
    assert_eq!(bank.get(0x0C), (1 << 13) | (1 << 5));
}

#[test]
fn stm32_ensure_enabled_sets_ue_once() {
    let bank = FakeBank::new();
    let uart = bank.transport(&STM32F4_USART);
    bank.set(0x0C, 1 << 5);

    uart.ensure_enabled();
    assert_eq!(bank.get(0x0C), (1 << 13) | (1 << 5));
    uart.ensure_enabled();
    assert_eq!(bank.get(0x0C), (1 << 13) | (1 << 5));
}

#[test]
fn pl011_flags_are_active_low() {
    let bank = FakeBank::new();
    let uart = bank.transport(&PL011);

    // Both FIFOs reported empty / not full
    bank.set(0x18, 1 << 4);
    assert!(!uart.data_available());
    assert!(uart.ready_to_send());

    // RX has data, TX FIFO full
    bank.set(0x18, 1 << 5);
    assert!(uart.data_available());
    assert!(!uart.ready_to_send());
}

#[test]
fn pl011_interrupt_mask_and_enable() {
    let bank = FakeBank::new();
    let uart = bank.transport(&PL011);

    uart.enable_transmit_event();
    uart.enable_receive_event();
    assert_eq!(bank.get(0x38), (1 << 5) | (1 << 4));
    uart.disable_transmit_event();
    assert_eq!(bank.get(0x38), 1 << 4);

    uart.ensure_enabled();
    assert_eq!(bank.get(0x30), 0x301);
    assert_eq!(uart.map(), &PL011);
}
