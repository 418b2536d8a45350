//! Serial peripheral register capability
//!
//! The driver core sees a UART only through [`SerialRegisters`]: a status
//! snapshot, a single-byte data register, and three interrupt sources it
//! may arm or disarm. Baud rate, framing and clocks are established by the
//! implementor before the driver is armed.

use bitflags::bitflags;

bitflags! {
    /// Status register snapshot.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct StatusFlags: u8 {
        /// Data register holds an unread inbound byte.
        const RX_READY = 1 << 0;
        /// Data register is vacant and accepts an outbound byte.
        const TX_EMPTY = 1 << 1;
        /// An inbound byte arrived before the previous one was read.
        const OVERRUN  = 1 << 2;
        /// Stop bit was not detected.
        const FRAMING  = 1 << 3;
        /// Parity check failed.
        const PARITY   = 1 << 4;
        /// Noise detected on the line.
        const NOISE    = 1 << 5;

        /// All line error conditions.
        const ERRORS = Self::OVERRUN.bits()
            | Self::FRAMING.bits()
            | Self::PARITY.bits()
            | Self::NOISE.bits();
    }
}

impl StatusFlags {
    /// Check if any line error is reported
    pub fn has_errors(self) -> bool {
        self.intersects(Self::ERRORS)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "StatusFlags({=u8:#x})", self.bits())
    }
}

bitflags! {
    /// Interrupt sources the driver may arm on the peripheral.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct InterruptSources: u8 {
        /// Fires while an inbound byte waits in the data register.
        const RX_READY = 1 << 0;
        /// Fires while the data register is vacant.
        const TX_EMPTY = 1 << 1;
        /// Fires on line errors (overrun, framing, parity, noise).
        const ERROR    = 1 << 2;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InterruptSources {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "InterruptSources({=u8:#x})", self.bits())
    }
}

/// Register-level access to one UART peripheral
///
/// Methods take `&self` because the registers are shared between the
/// application context and the interrupt context by nature. Implementations
/// must make every method safe to call from an interrupt handler that
/// preempts another call on the same instance; in practice that means
/// volatile accesses and a short critical section around read-modify-write
/// of control registers.
///
/// Exactly one value implementing this trait should exist per peripheral,
/// and it should not be `Clone`. Shared references do not implement the
/// trait, so a driver is bound by moving the value in:
///
/// ```compile_fail
/// use uartring_hal::{InterruptSources, SerialRegisters, StatusFlags};
///
/// struct Port;
///
/// impl SerialRegisters for Port {
///     fn status(&self) -> StatusFlags { StatusFlags::empty() }
///     fn enabled_interrupts(&self) -> InterruptSources { InterruptSources::empty() }
///     fn read_data(&self) -> u8 { 0 }
///     fn write_data(&self, _: u8) {}
///     fn enable_interrupts(&self, _: InterruptSources) {}
///     fn disable_interrupts(&self, _: InterruptSources) {}
///     fn clear_errors(&self) {}
///     fn is_ready(&self) -> bool { true }
/// }
///
/// fn bind<R: SerialRegisters>(_: R) {}
///
/// let port = Port;
/// bind(&port);
/// bind(&port);
/// ```
pub trait SerialRegisters {
    /// Read the status register once
    ///
    /// Must be called before [`read_data`](Self::read_data) when the
    /// caller needs the error flags, since some peripherals clear status
    /// as a side effect of reading the data register.
    fn status(&self) -> StatusFlags;

    /// Interrupt sources currently armed
    fn enabled_interrupts(&self) -> InterruptSources;

    /// Read the data register
    fn read_data(&self) -> u8;

    /// Write the data register
    fn write_data(&self, byte: u8);

    /// Arm the given interrupt sources, leaving the others untouched
    fn enable_interrupts(&self, sources: InterruptSources);

    /// Disarm the given interrupt sources, leaving the others untouched
    fn disable_interrupts(&self, sources: InterruptSources);

    /// Clear latched error flags using the peripheral's clear sequence
    fn clear_errors(&self);

    /// Check if the peripheral is enabled and configured
    fn is_ready(&self) -> bool;
}
