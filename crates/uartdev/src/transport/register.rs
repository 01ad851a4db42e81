// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Memory-mapped UART register bank.
//!
//! One driver covers every peripheral whose data, status and interrupt-enable
//! registers fit the [`RegisterMap`] shape. The register bank must be mapped
//! and the peripheral clocked and pinned before the transport is created.
//!
//! The interrupt-enable register is written from both contexts: the
//! foreground arms transmission, the interrupt handler disarms it. Its
//! read-modify-write therefore runs inside `critical_section::with`.

use core::ptr::{read_volatile, write_volatile};

use super::Transport;

/// A status register bit and its polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFlag {
    /// Bit mask within the status register.
    pub mask: u32,
    /// Condition holds while the bit is clear (e.g. PL011 "FIFO empty").
    pub active_low: bool,
}

impl StatusFlag {
    /// Condition holds while the bit is set.
    #[must_use]
    pub const fn high(mask: u32) -> Self {
        Self {
            mask,
            active_low: false,
        }
    }

    /// Condition holds while the bit is clear.
    #[must_use]
    pub const fn low(mask: u32) -> Self {
        Self {
            mask,
            active_low: true,
        }
    }

    /// Evaluate the flag against a status register value.
    #[inline]
    #[must_use]
    pub const fn holds(self, status: u32) -> bool {
        ((status & self.mask) != 0) != self.active_low
    }
}

/// Register layout of a UART peripheral. Offsets are in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    /// Data register (read: received byte, write: byte to send).
    pub data: usize,
    /// Status register.
    pub status: usize,
    /// Status flag meaning "received data available".
    pub rx_ready: StatusFlag,
    /// Status flag meaning "transmitter can accept a byte".
    pub tx_ready: StatusFlag,
    /// Interrupt-enable register.
    pub interrupt_enable: usize,
    /// Receive interrupt bit in the interrupt-enable register.
    pub rx_interrupt: u32,
    /// Transmit interrupt bit in the interrupt-enable register.
    pub tx_interrupt: u32,
    /// Control register holding the peripheral enable bits.
    pub control: usize,
    /// Bits that must be set in the control register for the UART to run.
    pub enable_mask: u32,
}

/// STM32F4 USART (SR/DR/CR1).
pub const STM32F4_USART: RegisterMap = RegisterMap {
    data: 0x04,
    status: 0x00,
    // SR.RXNE
    rx_ready: StatusFlag::high(1 << 5),
    // SR.TXE
    tx_ready: StatusFlag::high(1 << 7),
    interrupt_enable: 0x0C,
    // CR1.RXNEIE
    rx_interrupt: 1 << 5,
    // CR1.TXEIE
    tx_interrupt: 1 << 7,
    control: 0x0C,
    // CR1.UE
    enable_mask: 1 << 13,
};

/// ARM PL011 (UARTDR/UARTFR/UARTIMSC/UARTCR).
pub const PL011: RegisterMap = RegisterMap {
    data: 0x00,
    status: 0x18,
    // FR.RXFE: receive FIFO empty
    rx_ready: StatusFlag::low(1 << 4),
    // FR.TXFF: transmit FIFO full
    tx_ready: StatusFlag::low(1 << 5),
    interrupt_enable: 0x38,
    // IMSC.RXIM
    rx_interrupt: 1 << 4,
    // IMSC.TXIM
    tx_interrupt: 1 << 5,
    control: 0x30,
    // CR.UARTEN | CR.TXE | CR.RXE
    enable_mask: (1 << 0) | (1 << 8) | (1 << 9),
};

/// UART driven through its memory-mapped registers.
pub struct RegisterTransport {
    /// Virtual address of the register bank.
    base: *mut u32,
    map: &'static RegisterMap,
}

// SAFETY: MMIO accesses are single volatile loads and stores; the only
// read-modify-write runs inside a critical section.
unsafe impl Send for RegisterTransport {}
// SAFETY: See above.
unsafe impl Sync for RegisterTransport {}

impl RegisterTransport {
    /// Create a transport over the register bank at `base`.
    ///
    /// # Safety
    ///
    /// - `base` must point to mapped device memory laid out as `map`
    ///   describes, 4-byte aligned, for the lifetime of the transport
    /// - Nothing else may drive the same peripheral concurrently
    #[must_use]
    pub const unsafe fn new(base: *mut u32, map: &'static RegisterMap) -> Self {
        Self { base, map }
    }

    /// The register layout in use.
    #[must_use]
    pub const fn map(&self) -> &'static RegisterMap {
        self.map
    }

    fn register(&self, offset: usize) -> *mut u32 {
        // SAFETY: offsets come from the register map, which stays within the
        // bank guaranteed valid by `new`.
        unsafe { self.base.add(offset / 4) }
    }

    fn read(&self, offset: usize) -> u32 {
        // SAFETY: see `register`.
        unsafe { read_volatile(self.register(offset)) }
    }

    fn write(&self, offset: usize, value: u32) {
        // SAFETY: see `register`.
        unsafe { write_volatile(self.register(offset), value) }
    }

    fn modify(&self, offset: usize, f: impl FnOnce(u32) -> u32) {
        critical_section::with(|_| {
            let value = self.read(offset);
            self.write(offset, f(value));
        });
    }
}

impl Transport for RegisterTransport {
    fn data_available(&self) -> bool {
        self.map.rx_ready.holds(self.read(self.map.status))
    }

    fn ready_to_send(&self) -> bool {
        self.map.tx_ready.holds(self.read(self.map.status))
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "intentional u8 extraction from 32-bit UART data register"
    )]
    fn read_byte(&self) -> Option<u8> {
        Some(self.read(self.map.data) as u8)
    }

    fn write_byte(&self, byte: u8) {
        self.write(self.map.data, u32::from(byte));
    }

    fn enable_receive_event(&self) {
        let bit = self.map.rx_interrupt;
        self.modify(self.map.interrupt_enable, |value| value | bit);
    }

    fn enable_transmit_event(&self) {
        let bit = self.map.tx_interrupt;
        self.modify(self.map.interrupt_enable, |value| value | bit);
    }

    fn disable_transmit_event(&self) {
        let bit = self.map.tx_interrupt;
        self.modify(self.map.interrupt_enable, |value| value & !bit);
    }

    fn ensure_enabled(&self) {
        let mask = self.map.enable_mask;
        if self.read(self.map.control) & mask != mask {
            self.modify(self.map.control, |value| value | mask);
        }
    }
}
