//! USART register map (RM0008, section 27.6)

/// USART1 base address (APB2)
pub const USART1_BASE: usize = 0x4001_3800;
/// USART2 base address (APB1)
pub const USART2_BASE: usize = 0x4000_4400;
/// USART3 base address (APB1)
pub const USART3_BASE: usize = 0x4000_4800;

/// Register byte offsets
pub mod offset {
    /// Status register
    pub const SR: usize = 0x00;
    /// Data register
    pub const DR: usize = 0x04;
    /// Baud rate register
    pub const BRR: usize = 0x08;
    /// Control register 1
    pub const CR1: usize = 0x0C;
    /// Control register 2
    pub const CR2: usize = 0x10;
    /// Control register 3
    pub const CR3: usize = 0x14;
}

/// Size of the register block in 32-bit words
pub const BLOCK_WORDS: usize = 7;

/// SR bits
pub mod sr {
    /// Parity error
    pub const PE: u32 = 1 << 0;
    /// Framing error
    pub const FE: u32 = 1 << 1;
    /// Noise error
    pub const NE: u32 = 1 << 2;
    /// Overrun error
    pub const ORE: u32 = 1 << 3;
    /// Read data register not empty
    pub const RXNE: u32 = 1 << 5;
    /// Transmit data register empty
    pub const TXE: u32 = 1 << 7;
}

/// CR1 bits
pub mod cr1 {
    /// Receiver enable
    pub const RE: u32 = 1 << 2;
    /// Transmitter enable
    pub const TE: u32 = 1 << 3;
    /// RXNE interrupt enable
    pub const RXNEIE: u32 = 1 << 5;
    /// TXE interrupt enable
    pub const TXEIE: u32 = 1 << 7;
    /// Parity error interrupt enable
    pub const PEIE: u32 = 1 << 8;
    /// Parity selection (1 = odd)
    pub const PS: u32 = 1 << 9;
    /// Parity control enable
    pub const PCE: u32 = 1 << 10;
    /// Word length (1 = 9 bits)
    pub const M: u32 = 1 << 12;
    /// USART enable
    pub const UE: u32 = 1 << 13;
}

/// CR2 bits
pub mod cr2 {
    /// STOP field mask
    pub const STOP_MASK: u32 = 0b11 << 12;
    /// Two stop bits
    pub const STOP_2: u32 = 0b10 << 12;
}

/// CR3 bits
pub mod cr3 {
    /// Error interrupt enable (framing, overrun, noise)
    pub const EIE: u32 = 1 << 0;
}
