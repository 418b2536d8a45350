//! USART register capability
//!
//! [`Usart`] owns the register block of one USART and implements
//! [`SerialRegisters`] over it with volatile accesses. Control register
//! read-modify-write runs inside a critical section so the application and
//! the USART interrupt can both arm and disarm sources.

#![allow(unsafe_code)]

use core::ptr;

use portable_atomic::{AtomicBool, Ordering};
use uartring_hal::{InterruptSources, SerialRegisters, StatusFlags, UartConfig};

use crate::regs::{self, cr1, cr3, offset, sr};
use crate::uart::{brr_for, cr1_frame_bits, cr2_stop_bits, UartBusError};

/// USART instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsartId {
    Usart1,
    Usart2,
    Usart3,
}

impl UsartId {
    /// Register block base address
    pub const fn base(self) -> usize {
        match self {
            UsartId::Usart1 => regs::USART1_BASE,
            UsartId::Usart2 => regs::USART2_BASE,
            UsartId::Usart3 => regs::USART3_BASE,
        }
    }

    const fn index(self) -> usize {
        match self {
            UsartId::Usart1 => 0,
            UsartId::Usart2 => 1,
            UsartId::Usart3 => 2,
        }
    }
}

static TAKEN: [AtomicBool; 3] = [
    AtomicBool::new(false),
    AtomicBool::new(false),
    AtomicBool::new(false),
];

/// Register capability for one STM32F1 USART
///
/// Not `Clone`: one value per peripheral. Dropping a value obtained from
/// [`Usart::take`] makes the instance available again.
pub struct Usart {
    base: *mut u32,
    owner: Option<UsartId>,
}

// Only the register block is shared, and every access is volatile
unsafe impl Send for Usart {}
unsafe impl Sync for Usart {}

impl Usart {
    /// Claim a USART, once
    pub fn take(id: UsartId) -> Option<Self> {
        if TAKEN[id.index()].swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(Self {
            base: id.base() as *mut u32,
            owner: Some(id),
        })
    }

    /// Create a capability without claiming the instance
    ///
    /// # Safety
    ///
    /// No other `Usart` for `id` may be in use.
    pub unsafe fn steal(id: UsartId) -> Self {
        Self {
            base: id.base() as *mut u32,
            owner: None,
        }
    }

    /// Create a capability over an arbitrary register block
    ///
    /// # Safety
    ///
    /// `base` must point to [`regs::BLOCK_WORDS`] valid, aligned words that
    /// outlive the returned value and are not accessed through other means.
    pub unsafe fn from_ptr(base: *mut u32) -> Self {
        Self { base, owner: None }
    }

    fn reg(&self, offset: usize) -> *mut u32 {
        // SAFETY: offsets come from `regs::offset`, all inside the block
        unsafe { self.base.add(offset / 4) }
    }

    fn read(&self, offset: usize) -> u32 {
        // SAFETY: see `reg`
        unsafe { ptr::read_volatile(self.reg(offset)) }
    }

    fn write(&self, offset: usize, value: u32) {
        // SAFETY: see `reg`
        unsafe { ptr::write_volatile(self.reg(offset), value) }
    }

    fn modify(&self, offset: usize, f: impl FnOnce(u32) -> u32) {
        critical_section::with(|_| {
            let value = self.read(offset);
            self.write(offset, f(value));
        });
    }

    /// Program baud rate and frame format, then enable the USART
    ///
    /// `pclk_hz` is the clock of the bus the instance sits on (APB2 for
    /// USART1, APB1 for the others). Interrupt enables are left alone.
    pub fn configure(&self, pclk_hz: u32, config: &UartConfig) -> Result<(), UartBusError> {
        let brr = brr_for(pclk_hz, config.baudrate)?;
        let frame = cr1_frame_bits(config)?;
        let stop = cr2_stop_bits(config);

        // Frame format may only change while UE is clear
        self.modify(offset::CR1, |v| v & !cr1::UE);
        self.write(offset::BRR, brr as u32);
        self.modify(offset::CR2, |v| (v & !regs::cr2::STOP_MASK) | stop);
        self.modify(offset::CR1, |v| {
            let v = v & !(cr1::M | cr1::PCE | cr1::PS);
            v | frame | cr1::UE | cr1::TE | cr1::RE
        });

        #[cfg(feature = "defmt")]
        defmt::info!(
            "USART configured: {} baud, BRR {=u16:#x}",
            config.baudrate,
            brr
        );
        Ok(())
    }

    /// Disable the USART
    pub fn disable(&self) {
        self.modify(offset::CR1, |v| {
            v & !(cr1::UE | cr1::TE | cr1::RE | cr1::RXNEIE | cr1::TXEIE | cr1::PEIE)
        });
        self.modify(offset::CR3, |v| v & !cr3::EIE);
    }
}

impl Drop for Usart {
    fn drop(&mut self) {
        if let Some(id) = self.owner {
            TAKEN[id.index()].store(false, Ordering::Release);
        }
    }
}

/// Map an SR value onto driver status flags
pub fn status_from_sr(value: u32) -> StatusFlags {
    let mut status = StatusFlags::empty();
    status.set(StatusFlags::RX_READY, value & sr::RXNE != 0);
    status.set(StatusFlags::TX_EMPTY, value & sr::TXE != 0);
    status.set(StatusFlags::OVERRUN, value & sr::ORE != 0);
    status.set(StatusFlags::FRAMING, value & sr::FE != 0);
    status.set(StatusFlags::PARITY, value & sr::PE != 0);
    status.set(StatusFlags::NOISE, value & sr::NE != 0);
    status
}

/// CR1 and CR3 enable bits for a set of interrupt sources
pub fn enable_bits(sources: InterruptSources) -> (u32, u32) {
    let mut c1 = 0;
    let mut c3 = 0;
    if sources.contains(InterruptSources::RX_READY) {
        c1 |= cr1::RXNEIE;
    }
    if sources.contains(InterruptSources::TX_EMPTY) {
        c1 |= cr1::TXEIE;
    }
    if sources.contains(InterruptSources::ERROR) {
        c1 |= cr1::PEIE;
        c3 |= cr3::EIE;
    }
    (c1, c3)
}

impl SerialRegisters for Usart {
    fn status(&self) -> StatusFlags {
        status_from_sr(self.read(offset::SR))
    }

    fn enabled_interrupts(&self) -> InterruptSources {
        let c1 = self.read(offset::CR1);
        let c3 = self.read(offset::CR3);
        let mut sources = InterruptSources::empty();
        sources.set(InterruptSources::RX_READY, c1 & cr1::RXNEIE != 0);
        sources.set(InterruptSources::TX_EMPTY, c1 & cr1::TXEIE != 0);
        sources.set(InterruptSources::ERROR, c3 & cr3::EIE != 0);
        sources
    }

    fn read_data(&self) -> u8 {
        let data = self.read(offset::DR) as u8;
        // 7 data bits + parity: the parity bit lands in bit 7
        let c1 = self.read(offset::CR1);
        if c1 & (cr1::PCE | cr1::M) == cr1::PCE {
            data & 0x7F
        } else {
            data
        }
    }

    fn write_data(&self, byte: u8) {
        self.write(offset::DR, byte as u32);
    }

    fn enable_interrupts(&self, sources: InterruptSources) {
        let (c1, c3) = enable_bits(sources);
        critical_section::with(|_| {
            if c1 != 0 {
                self.write(offset::CR1, self.read(offset::CR1) | c1);
            }
            if c3 != 0 {
                self.write(offset::CR3, self.read(offset::CR3) | c3);
            }
        });
    }

    fn disable_interrupts(&self, sources: InterruptSources) {
        let (c1, c3) = enable_bits(sources);
        critical_section::with(|_| {
            if c1 != 0 {
                self.write(offset::CR1, self.read(offset::CR1) & !c1);
            }
            if c3 != 0 {
                self.write(offset::CR3, self.read(offset::CR3) & !c3);
            }
        });
    }

    fn clear_errors(&self) {
        // PE, FE, NE and ORE clear on an SR read followed by a DR read
        let _ = self.read(offset::SR);
        let _ = self.read(offset::DR);
    }

    fn is_ready(&self) -> bool {
        let c1 = self.read(offset::CR1);
        let on = cr1::UE | cr1::TE | cr1::RE;
        c1 & on == on
    }
}
