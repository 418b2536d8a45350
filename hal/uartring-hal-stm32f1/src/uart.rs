//! Frame and baud rate encoding for the STM32F1 USART
//!
//! Pure functions from [`UartConfig`] to register values, so the encoding
//! can be checked without hardware.

use uartring_hal::uart::{DataBits, Parity, StopBits};
use uartring_hal::UartConfig;

use crate::regs::{cr1, cr2};

/// Error from USART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartBusError {
    /// Baud rate is zero or out of range for the peripheral clock
    InvalidBaudrate,
    /// Data bits and parity combination the USART cannot frame as bytes
    UnsupportedFrame,
}

/// BRR value for `baudrate` at peripheral clock `pclk_hz`
///
/// With 16x oversampling the 12.4 fixed-point USARTDIV written to BRR is
/// simply `pclk / baud`, rounded to nearest.
pub fn brr_for(pclk_hz: u32, baudrate: u32) -> Result<u16, UartBusError> {
    if baudrate == 0 {
        return Err(UartBusError::InvalidBaudrate);
    }
    let div = (pclk_hz as u64 + baudrate as u64 / 2) / baudrate as u64;
    // USARTDIV below 1.0 cannot be programmed
    if !(16..=0xFFFF).contains(&div) {
        return Err(UartBusError::InvalidBaudrate);
    }
    Ok(div as u16)
}

/// CR1 word length and parity bits for a frame
///
/// The parity bit occupies the MSB of the word, so a parity frame uses one
/// word bit more than its payload. Payloads wider than a byte are rejected
/// because the driver moves `u8`s.
pub fn cr1_frame_bits(config: &UartConfig) -> Result<u32, UartBusError> {
    let parity = match config.parity {
        Parity::None => 0,
        Parity::Even => cr1::PCE,
        Parity::Odd => cr1::PCE | cr1::PS,
    };
    let word = match (config.data_bits, config.parity) {
        (DataBits::Eight, Parity::None) => 0,
        (DataBits::Eight, _) => cr1::M,
        (DataBits::Seven, Parity::Even | Parity::Odd) => 0,
        (DataBits::Seven, Parity::None) | (DataBits::Nine, _) => {
            return Err(UartBusError::UnsupportedFrame)
        }
    };
    Ok(word | parity)
}

/// CR2 STOP field for a frame
pub fn cr2_stop_bits(config: &UartConfig) -> u32 {
    match config.stop_bits {
        StopBits::One => 0,
        StopBits::Two => cr2::STOP_2,
    }
}
