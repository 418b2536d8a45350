//! Fixed-capacity circular buffer
//!
//! Storage is a plain array of `N` slots addressed by a read index and a
//! write index, both kept in `[0, N)`. A separate element count tells an
//! empty ring from a full one, so all `N` slots are usable.
//!
//! The indices and the count are atomics. The producer is the only writer
//! of the write index and of the slot it points to; the consumer is the
//! only writer of the read index. Both adjust the count with a single
//! read-modify-write, which is the synchronisation point between them:
//!
//! - producer: store slot, advance write index, `count += 1` (release)
//! - consumer: `count` (acquire), load slot, advance read index,
//!   `count -= 1` (release)
//!
//! A push therefore either lands completely or is rejected, and a pop never
//! observes a half-written slot.

#![allow(unsafe_code)]

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;

use portable_atomic::{AtomicUsize, Ordering};

use super::split::{Consumer, Producer};

/// Fixed-capacity FIFO ring of `N` elements
///
/// Used directly through `&mut self` when a single context owns it, or
/// [`split`](Self::split) into a [`Producer`] and a [`Consumer`] when the
/// two ends live in different execution contexts.
pub struct RingBuffer<T, const N: usize> {
    slots: [UnsafeCell<MaybeUninit<T>>; N],
    read: AtomicUsize,
    write: AtomicUsize,
    count: AtomicUsize,
}

// SAFETY: shared access only happens through one `Producer` and one
// `Consumer`, which touch disjoint slots and synchronise on `count`.
unsafe impl<T: Send, const N: usize> Sync for RingBuffer<T, N> {}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> RingBuffer<T, N> {
    const EMPTY_SLOT: UnsafeCell<MaybeUninit<T>> = UnsafeCell::new(MaybeUninit::uninit());

    /// Create an empty ring
    pub const fn new() -> Self {
        assert!(N > 0, "ring capacity must be non-zero");
        Self {
            slots: [Self::EMPTY_SLOT; N],
            read: AtomicUsize::new(0),
            write: AtomicUsize::new(0),
            count: AtomicUsize::new(0),
        }
    }

    /// Maximum number of elements
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of buffered elements
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Number of elements that can still be pushed
    pub fn free(&self) -> usize {
        N - self.len()
    }

    /// Check if no element is buffered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if every slot is occupied
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Split into producer and consumer handles
    ///
    /// The handles borrow the ring mutably, so nothing else can push, pop
    /// or clear while either is alive.
    pub fn split(&mut self) -> (Producer<'_, T, N>, Consumer<'_, T, N>) {
        let ring: &Self = self;
        (Producer::new(ring), Consumer::new(ring))
    }

    /// Reset to empty
    ///
    /// Buffered elements are forgotten without being dropped.
    pub fn clear(&mut self) {
        *self.read.get_mut() = 0;
        *self.write.get_mut() = 0;
        *self.count.get_mut() = 0;
    }

    /// Advance an index by one slot, wrapping at `N`
    #[inline]
    fn next(index: usize) -> usize {
        if index + 1 == N {
            0
        } else {
            index + 1
        }
    }

    /// Producer side of a push
    ///
    /// # Safety
    ///
    /// The caller must be the only producer of this ring for the duration
    /// of the call.
    pub(super) unsafe fn enqueue(&self, item: T) -> Result<(), T> {
        if self.count.load(Ordering::Acquire) == N {
            return Err(item);
        }

        let write = self.write.load(Ordering::Relaxed);
        // SAFETY: count < N, so the slot at `write` is not owned by the
        // consumer, and we are the only producer.
        unsafe { (*self.slots[write].get()).write(item) };
        self.write.store(Self::next(write), Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Release);
        Ok(())
    }

    /// Consumer side of a pop
    ///
    /// # Safety
    ///
    /// The caller must be the only consumer of this ring for the duration
    /// of the call.
    pub(super) unsafe fn dequeue(&self) -> Option<T> {
        if self.count.load(Ordering::Acquire) == 0 {
            return None;
        }

        let read = self.read.load(Ordering::Relaxed);
        // SAFETY: count > 0, so the slot at `read` was initialised by a
        // push whose release on `count` we acquired above.
        let item = unsafe { (*self.slots[read].get()).assume_init_read() };
        self.read.store(Self::next(read), Ordering::Relaxed);
        self.count.fetch_sub(1, Ordering::Release);
        Some(item)
    }

    /// Borrow the element `offset` positions after the oldest one
    ///
    /// # Safety
    ///
    /// The caller must be the only consumer of this ring and must not pop
    /// while the returned reference is alive.
    pub(super) unsafe fn peek_at(&self, offset: usize) -> Option<&T> {
        if offset >= self.count.load(Ordering::Acquire) {
            return None;
        }

        let mut index = self.read.load(Ordering::Relaxed) + offset;
        if index >= N {
            index -= N;
        }
        // SAFETY: the slot lies inside the occupied range, which the
        // producer never writes and which stays put until we pop.
        Some(unsafe { (*self.slots[index].get()).assume_init_ref() })
    }

    /// Push one element, handing it back if the ring is full
    ///
    /// Full rings reject rather than overwrite: dropping the oldest unread
    /// byte would corrupt whatever framing the reader is decoding.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        // SAFETY: `&mut self` excludes every other producer.
        unsafe { self.enqueue(item) }
    }

    /// Pop the oldest element
    pub fn pop(&mut self) -> Option<T> {
        // SAFETY: `&mut self` excludes every other consumer.
        unsafe { self.dequeue() }
    }

    /// Peek at the oldest element without removing it
    pub fn peek(&self) -> Option<&T> {
        // SAFETY: handles borrow the ring mutably, so none is alive while
        // `&self` is held and nothing can pop under this reference.
        unsafe { self.peek_at(0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_ring_is_empty() {
        let ring: RingBuffer<u8, 4> = RingBuffer::new();
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.capacity(), 4);
        assert_eq!(ring.free(), 4);
    }

    #[test]
    fn test_fifo_order() {
        let mut ring: RingBuffer<u8, 4> = RingBuffer::new();
        ring.push(b'A').unwrap();
        ring.push(b'T').unwrap();
        ring.push(b'\r').unwrap();
        assert_eq!(ring.len(), 3);

        assert_eq!(ring.pop(), Some(b'A'));
        assert_eq!(ring.pop(), Some(b'T'));
        assert_eq!(ring.pop(), Some(b'\r'));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_push_on_full_is_rejected() {
        let mut ring: RingBuffer<u8, 2> = RingBuffer::new();
        ring.push(1).unwrap();
        ring.push(2).unwrap();
        assert!(ring.is_full());

        // Third push is handed back, not written over the oldest byte
        assert_eq!(ring.push(3), Err(3));
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.pop(), Some(1));
        assert_eq!(ring.pop(), Some(2));
    }

    #[test]
    fn test_pop_on_empty_returns_none() {
        let mut ring: RingBuffer<u8, 2> = RingBuffer::new();
        assert_eq!(ring.pop(), None);
        ring.push(7).unwrap();
        ring.pop();
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_wraparound() {
        let mut ring: RingBuffer<u8, 3> = RingBuffer::new();
        for round in 0..10u8 {
            ring.push(round).unwrap();
            ring.push(round.wrapping_add(100)).unwrap();
            assert_eq!(ring.pop(), Some(round));
            assert_eq!(ring.pop(), Some(round.wrapping_add(100)));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_clear_resets_indices() {
        let mut ring: RingBuffer<u8, 3> = RingBuffer::new();
        ring.push(1).unwrap();
        ring.push(2).unwrap();
        ring.pop();
        ring.clear();

        assert!(ring.is_empty());
        assert_eq!(ring.peek(), None);
        for b in [4, 5, 6] {
            ring.push(b).unwrap();
        }
        assert!(ring.is_full());
        assert_eq!(ring.pop(), Some(4));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut ring: RingBuffer<u8, 3> = RingBuffer::new();
        ring.push(9).unwrap();
        assert_eq!(ring.peek(), Some(&9));
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.pop(), Some(9));
    }

    #[test]
    fn test_non_byte_elements() {
        let mut ring: RingBuffer<(u16, bool), 2> = RingBuffer::new();
        ring.push((0x1234, true)).unwrap();
        assert_eq!(ring.pop(), Some((0x1234, true)));
    }

    proptest! {
        #[test]
        fn prop_fifo_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..=64)) {
            let mut ring: RingBuffer<u8, 64> = RingBuffer::new();
            for &b in &data {
                prop_assert!(ring.push(b).is_ok());
            }
            prop_assert_eq!(ring.len(), data.len());

            let mut out = Vec::new();
            while let Some(b) = ring.pop() {
                out.push(b);
            }
            prop_assert_eq!(out, data);
        }

        #[test]
        fn prop_overflow_never_overwrites(extra in 1usize..16, seed in any::<u8>()) {
            let mut ring: RingBuffer<u8, 8> = RingBuffer::new();
            for i in 0..8u8 {
                ring.push(seed.wrapping_add(i)).unwrap();
            }
            for i in 0..extra {
                prop_assert_eq!(ring.push(i as u8), Err(i as u8));
            }
            for i in 0..8u8 {
                prop_assert_eq!(ring.pop(), Some(seed.wrapping_add(i)));
            }
            prop_assert_eq!(ring.pop(), None);
        }
    }
}
