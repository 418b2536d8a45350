//! Interrupt-driven serial transport
//!
//! This crate moves bytes between a UART data register and two
//! application-facing rings without blocking the main program:
//!
//! - Ring transport: fixed-capacity, lock-free single-producer /
//!   single-consumer rings ([`ring`])
//! - Serial driver: the line API for the application context and the
//!   interrupt entry point for the vector ([`driver`])
//! - Diagnostics counters filled by the interrupt path ([`diagnostics`])
//! - Error taxonomy ([`error`]) and driver configuration ([`config`])
//!
//! Register access goes exclusively through the
//! [`SerialRegisters`](uartring_hal::SerialRegisters) capability.
//!
//! # Contexts
//!
//! ```text
//!  application                          interrupt
//!  ───────────                          ─────────
//!  SerialPort::write ──► tx ring ──► SerialIrq::handle_interrupt ──► DR
//!  SerialPort::read  ◄── rx ring ◄── SerialIrq::handle_interrupt ◄── DR
//! ```
//!
//! Each ring has exactly one producer and one consumer, one per context.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod ring;

#[cfg(test)]
mod mock;

pub use config::DriverConfig;
pub use diagnostics::{Diagnostics, DiagnosticsSnapshot};
pub use driver::{DefaultSerialDriver, IrqEvent, Readiness, SerialDriver, SerialIrq, SerialPort};
pub use error::SerialError;
pub use ring::{Consumer, Producer, RingBuffer};
