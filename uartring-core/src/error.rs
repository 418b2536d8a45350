//! Serial driver error taxonomy
//!
//! Application-context failures come back as [`SerialError`] values.
//! Line errors seen by the interrupt handler have no caller to return to;
//! they are counted in [`Diagnostics`](crate::Diagnostics) instead.

use uartring_hal::StatusFlags;

/// Errors returned to the application context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// Transmit ring cannot take the data; retry after it drains
    BufferFull,
    /// `read` called with nothing buffered; check `is_empty` first
    BufferEmpty,
    /// Peripheral is not enabled/configured
    NotReady,
    /// Polled transfer exceeded its spin budget
    Timeout,
    /// Inbound byte lost because the previous one was not read in time
    Overrun,
    /// Stop bit missing
    Framing,
    /// Parity check failed
    Parity,
    /// Noise on the line
    Noise,
}

impl SerialError {
    /// Line error reported by a status snapshot, most severe first
    pub fn from_status(status: StatusFlags) -> Option<Self> {
        if status.contains(StatusFlags::OVERRUN) {
            Some(SerialError::Overrun)
        } else if status.contains(StatusFlags::FRAMING) {
            Some(SerialError::Framing)
        } else if status.contains(StatusFlags::PARITY) {
            Some(SerialError::Parity)
        } else if status.contains(StatusFlags::NOISE) {
            Some(SerialError::Noise)
        } else {
            None
        }
    }
}

impl embedded_io::Error for SerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        use embedded_io::ErrorKind;

        match self {
            SerialError::BufferFull => ErrorKind::OutOfMemory,
            SerialError::BufferEmpty => ErrorKind::Other,
            SerialError::NotReady => ErrorKind::NotConnected,
            SerialError::Timeout => ErrorKind::TimedOut,
            SerialError::Overrun
            | SerialError::Framing
            | SerialError::Parity
            | SerialError::Noise => ErrorKind::InvalidData,
        }
    }
}
