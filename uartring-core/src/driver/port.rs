//! Application half of a split serial driver
//!
//! [`SerialPort`] produces into the transmit ring and consumes from the
//! receive ring. Apart from `wait_for_data` nothing here blocks; the
//! interrupt half does the register traffic.

use embedded_hal::delay::DelayNs;
use uartring_hal::{InterruptSources, SerialRegisters};

use super::serial::Readiness;
use crate::config::DriverConfig;
use crate::diagnostics::{Diagnostics, DiagnosticsSnapshot};
use crate::error::SerialError;
use crate::ring::{Consumer, Producer};

/// Application-context handle: line-level read/write API
pub struct SerialPort<'a, R: SerialRegisters, const RX: usize, const TX: usize> {
    regs: &'a R,
    rx: Consumer<'a, u8, RX>,
    tx: Producer<'a, u8, TX>,
    diagnostics: &'a Diagnostics,
    pub(super) config: DriverConfig,
    readiness: Readiness,
}

impl<'a, R: SerialRegisters, const RX: usize, const TX: usize> SerialPort<'a, R, RX, TX> {
    pub(super) fn new(
        regs: &'a R,
        rx: Consumer<'a, u8, RX>,
        tx: Producer<'a, u8, TX>,
        diagnostics: &'a Diagnostics,
        config: DriverConfig,
        readiness: Readiness,
    ) -> Self {
        Self {
            regs,
            rx,
            tx,
            diagnostics,
            config,
            readiness,
        }
    }

    /// Queue `data` for transmission
    ///
    /// Either every byte is queued or none is: if the transmit ring lacks
    /// room for the whole message, `BufferFull` is returned and the ring is
    /// left untouched, so a message is never cut short on the wire.
    /// Messages longer than the ring capacity can never be queued this way;
    /// use [`try_write`](Self::try_write) to stream them.
    pub fn write(&mut self, data: &[u8]) -> Result<(), SerialError> {
        if data.len() > self.tx.free() {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "serial: tx backpressure ({} queued, {} requested)",
                self.tx.len(),
                data.len()
            );
            return Err(SerialError::BufferFull);
        }

        for &byte in data {
            // Only the interrupt handler touches the other end, and it can
            // only make room, so the free-space check above holds.
            self.write_char(byte)?;
        }
        Ok(())
    }

    /// Queue a single byte for transmission
    pub fn write_char(&mut self, byte: u8) -> Result<(), SerialError> {
        self.tx.push(byte).map_err(|_| SerialError::BufferFull)?;
        self.regs.enable_interrupts(InterruptSources::TX_EMPTY);
        Ok(())
    }

    /// Queue the bytes of a string for transmission
    pub fn write_str(&mut self, s: &str) -> Result<(), SerialError> {
        self.write(s.as_bytes())
    }

    /// Queue as much of `data` as fits, returning the count queued
    pub fn try_write(&mut self, data: &[u8]) -> usize {
        let mut queued = 0;
        for &byte in data {
            if self.write_char(byte).is_err() {
                break;
            }
            queued += 1;
        }
        queued
    }

    /// Take the oldest received byte
    ///
    /// Returns `BufferEmpty` when nothing is buffered; callers are expected
    /// to check [`is_empty`](Self::is_empty) first.
    pub fn read(&mut self) -> Result<u8, SerialError> {
        self.rx.pop().ok_or(SerialError::BufferEmpty)
    }

    /// Move buffered bytes into `buf`, returning how many were copied
    pub fn read_into(&mut self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.rx.pop() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Drain up to `N` buffered bytes
    pub fn read_data<const N: usize>(&mut self) -> heapless::Vec<u8, N> {
        let mut data = heapless::Vec::new();
        while !data.is_full() {
            match self.rx.pop() {
                Some(byte) => {
                    // Cannot fail: capacity checked by the loop condition
                    let _ = data.push(byte);
                }
                None => break,
            }
        }
        data
    }

    /// Check if the receive ring holds no byte
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Number of bytes waiting in the receive ring
    pub fn available(&self) -> usize {
        self.rx.len()
    }

    /// Number of bytes still queued for transmission
    pub fn tx_pending(&self) -> usize {
        self.tx.len()
    }

    /// Check if the transmit ring can take no more bytes
    pub fn is_tx_full(&self) -> bool {
        self.tx.is_full()
    }

    /// Check if the newest received bytes equal `expected`
    ///
    /// Nothing is consumed. An empty pattern always matches.
    pub fn ends_with(&self, expected: &[u8]) -> bool {
        self.rx.ends_with(expected)
    }

    /// Wait until the newest received bytes equal `expected`
    ///
    /// Re-checks the receive ring every `poll_interval_ms` until the last
    /// `expected.len()` buffered bytes match, or `timeout_ms` of delay has
    /// been spent. Matched bytes stay buffered. Interrupts are never masked
    /// here; the receive ring only fills while the handler keeps running.
    pub fn wait_for_data<D: DelayNs>(
        &mut self,
        expected: &[u8],
        timeout_ms: u32,
        delay: &mut D,
    ) -> bool {
        let mut elapsed = 0u32;
        loop {
            if self.rx.ends_with(expected) {
                return true;
            }
            if elapsed >= timeout_ms {
                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "serial: wait timed out after {} ms ({} bytes buffered)",
                    elapsed,
                    self.rx.len()
                );
                return false;
            }

            let step = self.config.poll_interval().min(timeout_ms - elapsed);
            delay.delay_ms(step);
            elapsed += step;
        }
    }

    /// Async variant of [`wait_for_data`](Self::wait_for_data)
    pub async fn wait_for_data_async<D>(
        &mut self,
        expected: &[u8],
        timeout_ms: u32,
        delay: &mut D,
    ) -> bool
    where
        D: embedded_hal_async::delay::DelayNs,
    {
        let mut elapsed = 0u32;
        loop {
            if self.rx.ends_with(expected) {
                return true;
            }
            if elapsed >= timeout_ms {
                #[cfg(feature = "defmt")]
                defmt::debug!("serial: async wait timed out after {} ms", elapsed);
                return false;
            }

            let step = self.config.poll_interval().min(timeout_ms - elapsed);
            delay.delay_ms(step).await;
            elapsed += step;
        }
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }
}

impl<'a, R: SerialRegisters, const RX: usize, const TX: usize> core::fmt::Write
    for SerialPort<'a, R, RX, TX>
{
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        SerialPort::write_str(self, s).map_err(|_| core::fmt::Error)
    }
}
