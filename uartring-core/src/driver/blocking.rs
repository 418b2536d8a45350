//! Polled fallback mode
//!
//! When interrupts cannot be used (early boot, a panic handler, a disarmed
//! driver) the same driver can still move bytes by busy-polling the status
//! register. This needs exclusive access to the driver, so no interrupt
//! half can be racing it for either ring.
//!
//! Bytes already in the rings keep their place: queued transmit bytes go
//! out before new data, buffered receive bytes are returned before the
//! hardware is polled.

use uartring_hal::{InterruptSources, SerialRegisters, StatusFlags, UartRx, UartTx};

use super::serial::SerialDriver;
use crate::error::SerialError;

impl<R: SerialRegisters, const RX: usize, const TX: usize> SerialDriver<R, RX, TX> {
    /// Spin until the status register shows `flag`, up to `spin_limit` reads
    fn poll_status(&self, flag: StatusFlags) -> Result<StatusFlags, SerialError> {
        for _ in 0..=self.config.spin_limit {
            let status = self.regs.status();
            if status.contains(flag) {
                return Ok(status);
            }
            core::hint::spin_loop();
        }
        Err(SerialError::Timeout)
    }

    fn send_polled(&self, byte: u8) -> Result<(), SerialError> {
        self.poll_status(StatusFlags::TX_EMPTY)?;
        self.regs.write_data(byte);
        self.diagnostics.record_sent();
        Ok(())
    }

    fn receive_polled(&self) -> Result<u8, SerialError> {
        let status = self.poll_status(StatusFlags::RX_READY)?;
        let byte = self.regs.read_data();
        if let Some(err) = SerialError::from_status(status) {
            self.diagnostics.record_line_errors(status);
            return Err(err);
        }
        self.diagnostics.record_received();
        Ok(byte)
    }

    /// Push the queued transmit bytes out by polling
    fn drain_tx_polled(&mut self) -> Result<(), SerialError> {
        if !self.regs.is_ready() {
            return Err(SerialError::NotReady);
        }
        while let Some(byte) = self.tx.peek().copied() {
            self.send_polled(byte)?;
            self.tx.pop();
        }
        // Nothing left for the interrupt path to send
        self.regs.disable_interrupts(InterruptSources::TX_EMPTY);
        Ok(())
    }
}

impl<R: SerialRegisters, const RX: usize, const TX: usize> UartTx for SerialDriver<R, RX, TX> {
    type Error = SerialError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.drain_tx_polled()?;
        for &byte in data {
            self.send_polled(byte)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        self.drain_tx_polled()
    }
}

impl<R: SerialRegisters, const RX: usize, const TX: usize> UartRx for SerialDriver<R, RX, TX> {
    type Error = SerialError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.rx.pop() {
                Some(byte) => {
                    buf[filled] = byte;
                    filled += 1;
                }
                None => break,
            }
        }

        if filled < buf.len() && !self.regs.is_ready() {
            return Err(SerialError::NotReady);
        }
        while filled < buf.len() {
            buf[filled] = self.receive_polled()?;
            filled += 1;
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriverConfig;
    use crate::mock::MockRegisters;

    type Driver = SerialDriver<MockRegisters, 8, 8>;

    fn driver(regs: &MockRegisters) -> Driver {
        SerialDriver::with_config(
            regs.clone(),
            DriverConfig {
                spin_limit: 8,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_write_blocking_sends_queued_bytes_first() {
        let regs = MockRegisters::new();
        let mut driver = driver(&regs);
        driver.write(b"AT").unwrap();

        driver.write_blocking(b"+GMR\r").unwrap();
        assert_eq!(regs.written(), b"AT+GMR\r");
        assert_eq!(driver.tx_pending(), 0);
        assert!(!regs.enabled().contains(InterruptSources::TX_EMPTY));
        assert_eq!(driver.diagnostics().bytes_sent, 7);
    }

    #[test]
    fn test_write_blocking_times_out_on_stuck_transmitter() {
        let regs = MockRegisters::new();
        let mut driver = driver(&regs);
        regs.set_tx_busy(true);

        assert_eq!(driver.write_blocking(b"x"), Err(SerialError::Timeout));
        assert!(regs.written().is_empty());
    }

    #[test]
    fn test_flush_keeps_unsent_byte_queued_on_timeout() {
        let regs = MockRegisters::new();
        let mut driver = driver(&regs);
        driver.write(b"ab").unwrap();
        regs.set_tx_busy(true);

        assert_eq!(UartTx::flush(&mut driver), Err(SerialError::Timeout));
        assert_eq!(driver.tx_pending(), 2);

        regs.set_tx_busy(false);
        UartTx::flush(&mut driver).unwrap();
        assert_eq!(regs.written(), b"ab");
    }

    #[test]
    fn test_polled_mode_requires_configured_peripheral() {
        let regs = MockRegisters::new();
        regs.set_ready(false);
        let mut driver = driver(&regs);

        assert_eq!(driver.write_blocking(b"x"), Err(SerialError::NotReady));
        let mut buf = [0u8; 1];
        assert_eq!(driver.read_blocking(&mut buf), Err(SerialError::NotReady));
    }

    #[test]
    fn test_read_blocking_returns_buffered_then_polled() {
        let regs = MockRegisters::new();
        let mut driver = driver(&regs);
        driver.init().unwrap();
        regs.feed(b"12");
        driver.handle_interrupt();
        driver.handle_interrupt();
        driver.disarm();

        regs.feed(b"34");
        let mut buf = [0u8; 4];
        assert_eq!(driver.read_blocking(&mut buf), Ok(4));
        assert_eq!(&buf, b"1234");
    }

    #[test]
    fn test_read_byte_reports_line_error() {
        let regs = MockRegisters::new();
        let mut driver = driver(&regs);
        regs.feed_with_errors(0x00, StatusFlags::FRAMING);
        regs.feed(b"k");

        assert_eq!(driver.read_byte(), Err(SerialError::Framing));
        assert_eq!(driver.read_byte(), Ok(b'k'));
        assert_eq!(driver.diagnostics().framing_errors, 1);
    }

    #[test]
    fn test_read_blocking_times_out_without_data() {
        let regs = MockRegisters::new();
        let mut driver = driver(&regs);
        let mut buf = [0u8; 2];
        assert_eq!(driver.read_blocking(&mut buf), Err(SerialError::Timeout));
    }
}
