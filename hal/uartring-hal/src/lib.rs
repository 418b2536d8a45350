//! uartring Hardware Abstraction Layer
//!
//! This crate defines the narrow capability interface the serial driver
//! core uses to reach a UART peripheral. Chip-specific crates implement it
//! on top of their register blocks; the core never touches registers
//! directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  uartring-core (rings + serial driver)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  uartring-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!           ┌───────────────────┐
//!           │ uartring-hal-     │
//!           │     stm32f1       │
//!           └───────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`registers::SerialRegisters`] - Status/data registers and interrupt sources
//! - [`uart::UartTx`], [`uart::UartRx`] - Blocking serial communication

#![no_std]
#![deny(unsafe_code)]

pub mod registers;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use registers::{InterruptSources, SerialRegisters, StatusFlags};
pub use uart::{UartConfig, UartRx, UartTx};
