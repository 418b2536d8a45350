//! Ring transport
//!
//! Fixed-capacity, allocation-free FIFO rings with wrap-around indexing.
//! A full ring rejects new elements instead of overwriting old ones.

pub mod buffer;
pub mod split;

pub use buffer::RingBuffer;
pub use split::{Consumer, Iter, Producer};
