//! STM32F1-specific HAL for the uartring serial driver
//!
//! This crate implements [`uartring_hal::SerialRegisters`] directly on the
//! USART register block of STM32F1 parts (F103 "Blue Pill" and similar):
//!
//! - [`usart::Usart`] - the register capability, one per peripheral
//! - [`uart`] - BRR/CR1/CR2 encoding of [`UartConfig`](uartring_hal::UartConfig)
//! - [`regs`] - register offsets and bit positions
//!
//! # Usage
//!
//! Clocks and the TX/RX pin alternate functions are set up by the board
//! code. The USART is then configured here and handed to the driver:
//!
//! ```ignore
//! let usart = Usart::take(UsartId::Usart1).unwrap();
//! usart.configure(72_000_000, &UartConfig::default())?;
//! let driver = SerialDriver::new(usart);
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod regs;
pub mod uart;
pub mod usart;

pub use uart::UartBusError;
pub use usart::{Usart, UsartId};
