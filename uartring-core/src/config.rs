//! Driver configuration
//!
//! Line settings (baud rate, framing) belong to the chip HAL; this only
//! covers how the driver itself waits.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Receive ring capacity used by [`DefaultSerialDriver`](crate::DefaultSerialDriver)
pub const DEFAULT_RX_CAPACITY: usize = 64;

/// Transmit ring capacity used by [`DefaultSerialDriver`](crate::DefaultSerialDriver)
pub const DEFAULT_TX_CAPACITY: usize = 64;

/// Serial driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriverConfig {
    /// Delay between receive-ring checks in `wait_for_data` (ms)
    pub poll_interval_ms: u32,
    /// Status register reads a polled transfer may spend per byte before
    /// giving up with `Timeout`
    pub spin_limit: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1,
            spin_limit: 100_000,
        }
    }
}

impl DriverConfig {
    /// Poll interval, never zero so timeouts always make progress
    pub fn poll_interval(&self) -> u32 {
        self.poll_interval_ms.max(1)
    }
}
