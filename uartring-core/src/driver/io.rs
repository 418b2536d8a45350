//! `embedded-io` adapters for the application half
//!
//! embedded-io requires `read`/`write` to make progress before returning,
//! so these spin in the application context until the interrupt handler
//! has moved at least one byte, bounded by `DriverConfig::spin_limit`.

use uartring_hal::SerialRegisters;

use super::port::SerialPort;
use crate::error::SerialError;

impl<'a, R: SerialRegisters, const RX: usize, const TX: usize> embedded_io::ErrorType
    for SerialPort<'a, R, RX, TX>
{
    type Error = SerialError;
}

impl<'a, R: SerialRegisters, const RX: usize, const TX: usize> embedded_io::Read
    for SerialPort<'a, R, RX, TX>
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        if buf.is_empty() {
            return Ok(0);
        }

        for _ in 0..=self.config.spin_limit {
            let count = self.read_into(buf);
            if count > 0 {
                return Ok(count);
            }
            core::hint::spin_loop();
        }
        Err(SerialError::Timeout)
    }
}

impl<'a, R: SerialRegisters, const RX: usize, const TX: usize> embedded_io::ReadReady
    for SerialPort<'a, R, RX, TX>
{
    fn read_ready(&mut self) -> Result<bool, SerialError> {
        Ok(!self.is_empty())
    }
}

impl<'a, R: SerialRegisters, const RX: usize, const TX: usize> embedded_io::Write
    for SerialPort<'a, R, RX, TX>
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, SerialError> {
        if buf.is_empty() {
            return Ok(0);
        }

        for _ in 0..=self.config.spin_limit {
            let count = self.try_write(buf);
            if count > 0 {
                return Ok(count);
            }
            core::hint::spin_loop();
        }
        Err(SerialError::Timeout)
    }

    /// Wait until the transmit ring has been handed to the hardware
    fn flush(&mut self) -> Result<(), SerialError> {
        let mut spins = 0;
        let mut pending = self.tx_pending();
        while pending > 0 {
            if spins >= self.config.spin_limit {
                return Err(SerialError::Timeout);
            }
            core::hint::spin_loop();

            let now = self.tx_pending();
            if now < pending {
                spins = 0;
            } else {
                spins += 1;
            }
            pending = now;
        }
        Ok(())
    }
}

impl<'a, R: SerialRegisters, const RX: usize, const TX: usize> embedded_io::WriteReady
    for SerialPort<'a, R, RX, TX>
{
    fn write_ready(&mut self) -> Result<bool, SerialError> {
        Ok(!self.is_tx_full())
    }
}

#[cfg(test)]
mod tests {
    use embedded_io::{Read, ReadReady, Write, WriteReady};

    use crate::config::DriverConfig;
    use crate::driver::SerialDriver;
    use crate::error::SerialError;
    use crate::mock::MockRegisters;

    fn config() -> DriverConfig {
        DriverConfig {
            spin_limit: 16,
            ..Default::default()
        }
    }

    #[test]
    fn test_read_returns_what_is_buffered() {
        let regs = MockRegisters::new();
        let mut driver: SerialDriver<MockRegisters, 8, 8> =
            SerialDriver::with_config(regs.clone(), config());
        driver.init().unwrap();
        regs.feed(b"abc");

        let (mut port, mut irq) = driver.split();
        assert!(!port.read_ready().unwrap());
        for _ in 0..3 {
            irq.handle_interrupt();
        }
        assert!(port.read_ready().unwrap());

        let mut buf = [0u8; 8];
        assert_eq!(Read::read(&mut port, &mut buf), Ok(3));
        assert_eq!(&buf[..3], b"abc");
    }

    #[test]
    fn test_read_times_out_when_nothing_arrives() {
        let regs = MockRegisters::new();
        let mut driver: SerialDriver<MockRegisters, 8, 8> =
            SerialDriver::with_config(regs.clone(), config());
        let (mut port, _irq) = driver.split();

        let mut buf = [0u8; 4];
        assert_eq!(Read::read(&mut port, &mut buf), Err(SerialError::Timeout));
        assert_eq!(Read::read(&mut port, &mut []), Ok(0));
    }

    #[test]
    fn test_write_is_partial_when_ring_nearly_full() {
        let regs = MockRegisters::new();
        let mut driver: SerialDriver<MockRegisters, 8, 4> =
            SerialDriver::with_config(regs.clone(), config());
        let (mut port, _irq) = driver.split();

        assert_eq!(Write::write(&mut port, b"abcdef"), Ok(4));
        assert!(!port.write_ready().unwrap());
        assert_eq!(Write::write(&mut port, b"ef"), Err(SerialError::Timeout));
    }

    #[test]
    fn test_flush_times_out_without_interrupts() {
        let regs = MockRegisters::new();
        let mut driver: SerialDriver<MockRegisters, 8, 4> =
            SerialDriver::with_config(regs.clone(), config());
        let (mut port, _irq) = driver.split();

        port.flush().unwrap();
        Write::write(&mut port, b"x").unwrap();
        assert_eq!(port.flush(), Err(SerialError::Timeout));
    }

    #[test]
    fn test_write_all_through_embedded_io() {
        let regs = MockRegisters::new();
        let mut driver: SerialDriver<MockRegisters, 8, 8> =
            SerialDriver::with_config(regs.clone(), config());
        driver.init().unwrap();

        {
            let (mut port, _irq) = driver.split();
            port.write_all(b"AT\r\n").unwrap();
        }
        while driver.tx_pending() > 0 {
            driver.handle_interrupt();
        }
        assert_eq!(regs.written(), b"AT\r\n");
    }
}
