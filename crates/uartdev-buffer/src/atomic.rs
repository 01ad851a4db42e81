// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Atomic types used for indices and flags.
//!
//! Re-exported so dependent crates use the same implementation as the buffer
//! regardless of which `portable-atomic*` feature is active.

#[cfg(not(feature = "portable-atomic"))]
pub use core::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering, fence};

#[cfg(feature = "portable-atomic")]
pub use portable_atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering, fence};
