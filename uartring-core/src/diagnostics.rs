//! Line diagnostics
//!
//! Counters filled by the interrupt handler and read by the application.
//! They are observability only; nothing in the driver acts on them.

use portable_atomic::{AtomicU32, Ordering};
use uartring_hal::StatusFlags;

/// Interrupt-side event counters
#[derive(Debug, Default)]
pub struct Diagnostics {
    overruns: AtomicU32,
    framing_errors: AtomicU32,
    parity_errors: AtomicU32,
    noise_errors: AtomicU32,
    bytes_received: AtomicU32,
    bytes_sent: AtomicU32,
}

/// Point-in-time copy of [`Diagnostics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticsSnapshot {
    /// Inbound bytes lost: hardware overrun or receive ring full
    pub overruns: u32,
    /// Bytes discarded for a missing stop bit
    pub framing_errors: u32,
    /// Bytes discarded for a parity mismatch
    pub parity_errors: u32,
    /// Bytes discarded for line noise
    pub noise_errors: u32,
    /// Bytes placed in the receive ring
    pub bytes_received: u32,
    /// Bytes written to the data register
    pub bytes_sent: u32,
}

impl DiagnosticsSnapshot {
    /// Sum of every error counter
    pub fn total_errors(&self) -> u32 {
        self.overruns
            .saturating_add(self.framing_errors)
            .saturating_add(self.parity_errors)
            .saturating_add(self.noise_errors)
    }
}

impl Diagnostics {
    /// Create zeroed counters
    pub const fn new() -> Self {
        Self {
            overruns: AtomicU32::new(0),
            framing_errors: AtomicU32::new(0),
            parity_errors: AtomicU32::new(0),
            noise_errors: AtomicU32::new(0),
            bytes_received: AtomicU32::new(0),
            bytes_sent: AtomicU32::new(0),
        }
    }

    /// Count a byte dropped because there was no room for it
    pub fn record_overrun(&self) {
        self.overruns.fetch_add(1, Ordering::Relaxed);
    }

    /// Count every line error flag present in a status snapshot
    pub fn record_line_errors(&self, status: StatusFlags) {
        if status.contains(StatusFlags::OVERRUN) {
            self.overruns.fetch_add(1, Ordering::Relaxed);
        }
        if status.contains(StatusFlags::FRAMING) {
            self.framing_errors.fetch_add(1, Ordering::Relaxed);
        }
        if status.contains(StatusFlags::PARITY) {
            self.parity_errors.fetch_add(1, Ordering::Relaxed);
        }
        if status.contains(StatusFlags::NOISE) {
            self.noise_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_received(&self) {
        self.bytes_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sent(&self) {
        self.bytes_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy all counters
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            overruns: self.overruns.load(Ordering::Relaxed),
            framing_errors: self.framing_errors.load(Ordering::Relaxed),
            parity_errors: self.parity_errors.load(Ordering::Relaxed),
            noise_errors: self.noise_errors.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
        }
    }

    /// Zero all counters
    pub fn reset(&self) {
        self.overruns.store(0, Ordering::Relaxed);
        self.framing_errors.store(0, Ordering::Relaxed);
        self.parity_errors.store(0, Ordering::Relaxed);
        self.noise_errors.store(0, Ordering::Relaxed);
        self.bytes_received.store(0, Ordering::Relaxed);
        self.bytes_sent.store(0, Ordering::Relaxed);
    }
}
