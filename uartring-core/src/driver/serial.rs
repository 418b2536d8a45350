//! Serial driver ownership and lifecycle
//!
//! [`SerialDriver`] owns the register capability, both rings and the
//! diagnostics counters. Lifecycle operations (`init`, `disarm`, `clear`,
//! `release`) need `&mut self`, which also proves that no
//! [`SerialPort`]/[`SerialIrq`] pair is alive while they run.

use uartring_hal::{InterruptSources, SerialRegisters};

use super::irq::{IrqEvent, SerialIrq};
use super::port::SerialPort;
use crate::config::{DriverConfig, DEFAULT_RX_CAPACITY, DEFAULT_TX_CAPACITY};
use crate::diagnostics::{Diagnostics, DiagnosticsSnapshot};
use crate::error::SerialError;
use crate::ring::RingBuffer;

/// Driver readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Readiness {
    /// Bound to a peripheral, receive/error interrupts not armed
    Uninitialized,
    /// Receive and error interrupt sources armed
    Ready,
}

/// Interrupt-driven serial driver for one UART peripheral
///
/// `RX` and `TX` are the receive and transmit ring capacities.
///
/// # Usage
///
/// ```ignore
/// let driver = DRIVER.init(SerialDriver::new(usart));
/// driver.init()?;
/// let (port, irq) = driver.split();
/// // hand `irq` to the USART vector, keep `port` in the application
/// ```
pub struct SerialDriver<
    R: SerialRegisters,
    const RX: usize = DEFAULT_RX_CAPACITY,
    const TX: usize = DEFAULT_TX_CAPACITY,
> {
    pub(super) regs: R,
    pub(super) rx: RingBuffer<u8, RX>,
    pub(super) tx: RingBuffer<u8, TX>,
    pub(super) diagnostics: Diagnostics,
    pub(super) config: DriverConfig,
    readiness: Readiness,
}

/// Serial driver with the reference 64-byte rings
pub type DefaultSerialDriver<R> = SerialDriver<R, DEFAULT_RX_CAPACITY, DEFAULT_TX_CAPACITY>;

impl<R: SerialRegisters, const RX: usize, const TX: usize> SerialDriver<R, RX, TX> {
    /// Bind a driver to a peripheral
    ///
    /// No interrupt source is touched until [`init`](Self::init).
    pub fn new(regs: R) -> Self {
        Self::with_config(regs, DriverConfig::default())
    }

    /// Bind a driver to a peripheral with explicit configuration
    pub fn with_config(regs: R, config: DriverConfig) -> Self {
        Self {
            regs,
            rx: RingBuffer::new(),
            tx: RingBuffer::new(),
            diagnostics: Diagnostics::new(),
            config,
            readiness: Readiness::Uninitialized,
        }
    }

    /// Arm the receive-ready and error interrupt sources
    ///
    /// Calling this on a driver that is already [`Readiness::Ready`] does
    /// nothing.
    pub fn init(&mut self) -> Result<(), SerialError> {
        if self.readiness == Readiness::Ready {
            return Ok(());
        }

        if !self.regs.is_ready() {
            #[cfg(feature = "defmt")]
            defmt::warn!("serial: peripheral not configured, refusing to arm");
            return Err(SerialError::NotReady);
        }

        self.regs
            .enable_interrupts(InterruptSources::RX_READY | InterruptSources::ERROR);
        if !self.tx.is_empty() {
            self.regs.enable_interrupts(InterruptSources::TX_EMPTY);
        }
        self.readiness = Readiness::Ready;

        #[cfg(feature = "defmt")]
        defmt::info!("serial: armed (rx={}, tx={})", RX, TX);
        Ok(())
    }

    /// Disarm every interrupt source and return to `Uninitialized`
    ///
    /// Buffered bytes are kept.
    pub fn disarm(&mut self) {
        self.regs.disable_interrupts(InterruptSources::all());
        self.readiness = Readiness::Uninitialized;

        #[cfg(feature = "defmt")]
        defmt::info!("serial: disarmed");
    }

    /// Empty both rings
    ///
    /// The transmit-empty source is disarmed along with the transmit ring
    /// so it does not keep firing with nothing to send.
    pub fn clear(&mut self) {
        self.regs.disable_interrupts(InterruptSources::TX_EMPTY);
        self.rx.clear();
        self.tx.clear();

        #[cfg(feature = "defmt")]
        defmt::debug!("serial: rings cleared");
    }

    /// Split into the application half and the interrupt half
    pub fn split(&mut self) -> (SerialPort<'_, R, RX, TX>, SerialIrq<'_, R, RX, TX>) {
        let (rx_producer, rx_consumer) = self.rx.split();
        let (tx_producer, tx_consumer) = self.tx.split();

        let port = SerialPort::new(
            &self.regs,
            rx_consumer,
            tx_producer,
            &self.diagnostics,
            self.config,
            self.readiness,
        );
        let irq = SerialIrq::new(&self.regs, rx_producer, tx_consumer, &self.diagnostics);
        (port, irq)
    }

    /// Disarm the peripheral and give the register capability back
    #[allow(unsafe_code)]
    pub fn release(mut self) -> R {
        self.disarm();
        let this = core::mem::ManuallyDrop::new(self);
        // SAFETY: `this` is never used or dropped again, so moving the
        // capability out leaves no second owner. The remaining fields hold
        // only `u8` storage and atomics, which have no drop glue.
        unsafe { core::ptr::read(&this.regs) }
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Shared access to the register capability
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Check if the receive ring holds no byte
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Number of bytes waiting in the receive ring
    pub fn available(&self) -> usize {
        self.rx.len()
    }

    /// Number of bytes waiting in the transmit ring
    pub fn tx_pending(&self) -> usize {
        self.tx.len()
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    pub fn reset_diagnostics(&self) {
        self.diagnostics.reset();
    }

    // Single-context conveniences. Each borrows both halves for the
    // duration of the call.

    /// See [`SerialPort::write`]
    pub fn write(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.split().0.write(data)
    }

    /// See [`SerialPort::write_char`]
    pub fn write_char(&mut self, byte: u8) -> Result<(), SerialError> {
        self.split().0.write_char(byte)
    }

    /// See [`SerialPort::write_str`]
    pub fn write_str(&mut self, s: &str) -> Result<(), SerialError> {
        self.split().0.write_str(s)
    }

    /// See [`SerialPort::read`]
    pub fn read(&mut self) -> Result<u8, SerialError> {
        self.split().0.read()
    }

    /// See [`SerialPort::read_into`]
    pub fn read_into(&mut self, buf: &mut [u8]) -> usize {
        self.split().0.read_into(buf)
    }

    /// See [`SerialPort::read_data`]
    pub fn read_data<const N: usize>(&mut self) -> heapless::Vec<u8, N> {
        self.split().0.read_data()
    }

    /// See [`SerialPort::ends_with`]
    ///
    /// Nothing refills the receive ring while `&mut self` is held, so this
    /// checks once instead of waiting. Use
    /// [`SerialPort::wait_for_data`] on the split halves to wait for a
    /// response while the interrupt handler is live.
    pub fn ends_with(&mut self, expected: &[u8]) -> bool {
        self.split().0.ends_with(expected)
    }

    /// See [`SerialIrq::handle_interrupt`]
    pub fn handle_interrupt(&mut self) -> IrqEvent {
        self.split().1.handle_interrupt()
    }
}

impl<R: SerialRegisters, const RX: usize, const TX: usize> Drop for SerialDriver<R, RX, TX> {
    fn drop(&mut self) {
        // No interrupt may reach a driver that no longer exists
        self.regs.disable_interrupts(InterruptSources::all());
    }
}
