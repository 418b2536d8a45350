//! Serial driver
//!
//! - [`SerialDriver`]: owns the peripheral capability and both rings;
//!   lifecycle (`init`, `disarm`, `clear`, `release`) and `split`
//! - [`SerialPort`]: application half (write/read/wait)
//! - [`SerialIrq`]: interrupt half (`handle_interrupt`)
//!
//! The polled fallback ([`UartTx`](uartring_hal::UartTx) /
//! [`UartRx`](uartring_hal::UartRx) on the driver) and the `embedded-io`
//! adapters on the port live in their own modules.

mod blocking;
mod io;
pub mod irq;
pub mod port;
pub mod serial;

pub use irq::{IrqEvent, SerialIrq};
pub use port::SerialPort;
pub use serial::{DefaultSerialDriver, Readiness, SerialDriver};
