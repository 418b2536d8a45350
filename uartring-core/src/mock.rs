//! Simulated UART register block for tests

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use uartring_hal::{InterruptSources, SerialRegisters, StatusFlags};

#[derive(Debug)]
struct MockState {
    incoming: RefCell<VecDeque<(u8, StatusFlags)>>,
    written: RefCell<Vec<u8>>,
    enabled: Cell<InterruptSources>,
    pending_errors: Cell<StatusFlags>,
    sticky_errors: Cell<bool>,
    tx_busy: Cell<bool>,
    ready: Cell<bool>,
    enable_calls: Cell<u32>,
    status_reads: Cell<u32>,
}

/// Host-side stand-in for a UART peripheral
///
/// The driver owns one handle; the test keeps a clone to feed bytes and
/// inspect register state. Inbound bytes queued with [`feed`](Self::feed)
/// appear one at a time in the data register; every write to the data
/// register is recorded. The transmit data register is vacant unless
/// [`set_tx_busy`] says otherwise.
///
/// [`set_tx_busy`]: Self::set_tx_busy
#[derive(Debug, Clone)]
pub struct MockRegisters {
    state: Rc<MockState>,
}

impl Default for MockRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRegisters {
    pub fn new() -> Self {
        Self {
            state: Rc::new(MockState {
                incoming: RefCell::new(VecDeque::new()),
                written: RefCell::new(Vec::new()),
                enabled: Cell::new(InterruptSources::empty()),
                pending_errors: Cell::new(StatusFlags::empty()),
                sticky_errors: Cell::new(false),
                tx_busy: Cell::new(false),
                ready: Cell::new(true),
                enable_calls: Cell::new(0),
                status_reads: Cell::new(0),
            }),
        }
    }

    /// Check if two handles refer to the same simulated peripheral
    pub fn same_peripheral(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Queue inbound bytes
    pub fn feed(&self, bytes: &[u8]) {
        let mut incoming = self.state.incoming.borrow_mut();
        for &b in bytes {
            incoming.push_back((b, StatusFlags::empty()));
        }
    }

    /// Queue one inbound byte that arrives with line error flags
    pub fn feed_with_errors(&self, byte: u8, errors: StatusFlags) {
        self.state.incoming.borrow_mut().push_back((byte, errors));
    }

    /// Latch error flags without a byte in the data register
    pub fn raise_errors(&self, errors: StatusFlags) {
        let s = &self.state;
        s.pending_errors.set(s.pending_errors.get() | errors);
    }

    /// Keep error flags latched across data register reads until
    /// `clear_errors` runs
    pub fn set_sticky_errors(&self, sticky: bool) {
        self.state.sticky_errors.set(sticky);
    }

    pub fn set_tx_busy(&self, busy: bool) {
        self.state.tx_busy.set(busy);
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.ready.set(ready);
    }

    pub fn written(&self) -> Vec<u8> {
        self.state.written.borrow().clone()
    }

    pub fn pending_rx(&self) -> usize {
        self.state.incoming.borrow().len()
    }

    pub fn enabled(&self) -> InterruptSources {
        self.state.enabled.get()
    }

    /// Number of `enable_interrupts` calls that actually changed a bit
    pub fn enable_calls(&self) -> u32 {
        self.state.enable_calls.get()
    }

    pub fn status_reads(&self) -> u32 {
        self.state.status_reads.get()
    }
}

impl SerialRegisters for MockRegisters {
    fn status(&self) -> StatusFlags {
        let s = &self.state;
        s.status_reads.set(s.status_reads.get() + 1);

        let mut status = s.pending_errors.get();
        if let Some(&(_, errors)) = s.incoming.borrow().front() {
            status |= StatusFlags::RX_READY | errors;
        }
        if !s.tx_busy.get() {
            status |= StatusFlags::TX_EMPTY;
        }
        status
    }

    fn enabled_interrupts(&self) -> InterruptSources {
        self.state.enabled.get()
    }

    fn read_data(&self) -> u8 {
        let s = &self.state;
        let (byte, errors) = s
            .incoming
            .borrow_mut()
            .pop_front()
            .unwrap_or((0, StatusFlags::empty()));

        if s.sticky_errors.get() {
            s.pending_errors.set(s.pending_errors.get() | errors);
        } else {
            // Reading the data register clears latched errors, like the F1 does
            s.pending_errors.set(StatusFlags::empty());
        }
        byte
    }

    fn write_data(&self, byte: u8) {
        self.state.written.borrow_mut().push(byte);
    }

    fn enable_interrupts(&self, sources: InterruptSources) {
        let s = &self.state;
        let before = s.enabled.get();
        if !before.contains(sources) {
            s.enable_calls.set(s.enable_calls.get() + 1);
        }
        s.enabled.set(before | sources);
    }

    fn disable_interrupts(&self, sources: InterruptSources) {
        let s = &self.state;
        s.enabled.set(s.enabled.get() - sources);
    }

    fn clear_errors(&self) {
        let s = &self.state;
        s.pending_errors.set(StatusFlags::empty());
        if let Some(front) = s.incoming.borrow_mut().front_mut() {
            front.1 = StatusFlags::empty();
        }
    }

    fn is_ready(&self) -> bool {
        self.state.ready.get()
    }
}
