//! Interrupt half of a split serial driver
//!
//! [`SerialIrq::handle_interrupt`] is the single entry point the USART
//! vector calls. It services at most one byte per invocation, takes no
//! locks and never waits: the peripheral re-raises the interrupt for
//! whatever is still pending.

use uartring_hal::{InterruptSources, SerialRegisters, StatusFlags};

use crate::diagnostics::Diagnostics;
use crate::ring::{Consumer, Producer};

/// What one interrupt invocation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqEvent {
    /// Byte moved from the data register into the receive ring
    Received(u8),
    /// Byte read but the receive ring was full; it was dropped
    Dropped(u8),
    /// Byte moved from the transmit ring into the data register
    Sent(u8),
    /// Transmit ring empty; transmit-empty source disarmed
    TxIdle,
    /// Line error flags seen; the affected byte (if any) was discarded
    LineError(StatusFlags),
    /// No armed condition was pending
    Spurious,
}

/// Interrupt-context handle: produces into the receive ring and consumes
/// from the transmit ring
pub struct SerialIrq<'a, R: SerialRegisters, const RX: usize, const TX: usize> {
    regs: &'a R,
    rx: Producer<'a, u8, RX>,
    tx: Consumer<'a, u8, TX>,
    diagnostics: &'a Diagnostics,
}

impl<'a, R: SerialRegisters, const RX: usize, const TX: usize> SerialIrq<'a, R, RX, TX> {
    pub(super) fn new(
        regs: &'a R,
        rx: Producer<'a, u8, RX>,
        tx: Consumer<'a, u8, TX>,
        diagnostics: &'a Diagnostics,
    ) -> Self {
        Self {
            regs,
            rx,
            tx,
            diagnostics,
        }
    }

    /// Service the peripheral once
    ///
    /// Order matters: status is snapshotted before the data register is
    /// touched, because reading data clears the error flags on some parts.
    /// Receive is served before transmit so inbound bytes are not lost while
    /// a long outbound message drains.
    pub fn handle_interrupt(&mut self) -> IrqEvent {
        let status = self.regs.status();
        let armed = self.regs.enabled_interrupts();

        if status.contains(StatusFlags::RX_READY) && armed.contains(InterruptSources::RX_READY) {
            let byte = self.regs.read_data();

            if status.has_errors() {
                self.diagnostics.record_line_errors(status);
                self.regs.clear_errors();
                return IrqEvent::LineError(status & StatusFlags::ERRORS);
            }

            return match self.rx.push(byte) {
                Ok(()) => {
                    self.diagnostics.record_received();
                    IrqEvent::Received(byte)
                }
                Err(byte) => {
                    // No room and no way to grow here; count the loss
                    self.diagnostics.record_overrun();
                    IrqEvent::Dropped(byte)
                }
            };
        }

        if status.contains(StatusFlags::TX_EMPTY) && armed.contains(InterruptSources::TX_EMPTY) {
            return match self.tx.pop() {
                Some(byte) => {
                    self.regs.write_data(byte);
                    self.diagnostics.record_sent();
                    IrqEvent::Sent(byte)
                }
                None => {
                    // TXE stays asserted while the register is vacant
                    self.regs.disable_interrupts(InterruptSources::TX_EMPTY);
                    IrqEvent::TxIdle
                }
            };
        }

        if status.has_errors() {
            self.diagnostics.record_line_errors(status);
            self.regs.clear_errors();
            return IrqEvent::LineError(status & StatusFlags::ERRORS);
        }

        IrqEvent::Spurious
    }
}
