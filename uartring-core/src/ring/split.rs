//! Producer and consumer handles of a split ring
//!
//! A [`RingBuffer`] split into one [`Producer`] and one [`Consumer`] can be
//! shared between an interrupt handler and the code it preempts without
//! locks: the producer only ever moves the write index, the consumer only
//! ever moves the read index.

#![allow(unsafe_code)]

use super::buffer::RingBuffer;

/// Push end of a split ring
pub struct Producer<'a, T, const N: usize> {
    ring: &'a RingBuffer<T, N>,
}

/// Pop end of a split ring
pub struct Consumer<'a, T, const N: usize> {
    ring: &'a RingBuffer<T, N>,
}

impl<'a, T, const N: usize> Producer<'a, T, N> {
    pub(super) fn new(ring: &'a RingBuffer<T, N>) -> Self {
        Self { ring }
    }

    /// Push one element, handing it back if the ring is full
    pub fn push(&mut self, item: T) -> Result<(), T> {
        // SAFETY: `split` hands out exactly one producer per mutable
        // borrow of the ring, and `&mut self` serialises its own calls.
        unsafe { self.ring.enqueue(item) }
    }

    /// Number of buffered elements
    ///
    /// May grow stale immediately as the consumer drains, but never
    /// overstates the free space.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Check if no element is buffered
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Check if every slot is occupied
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Number of elements that can still be pushed
    ///
    /// Only the consumer can change this concurrently, and only upwards.
    pub fn free(&self) -> usize {
        self.ring.free()
    }

    /// Maximum number of elements
    pub fn capacity(&self) -> usize {
        N
    }
}

impl<'a, T, const N: usize> Consumer<'a, T, N> {
    pub(super) fn new(ring: &'a RingBuffer<T, N>) -> Self {
        Self { ring }
    }

    /// Pop the oldest element
    pub fn pop(&mut self) -> Option<T> {
        // SAFETY: exactly one consumer exists per split, and `&mut self`
        // serialises its own calls.
        unsafe { self.ring.dequeue() }
    }

    /// Peek at the oldest element without removing it
    pub fn peek(&self) -> Option<&T> {
        // SAFETY: popping needs `&mut self`, which cannot coexist with the
        // returned borrow.
        unsafe { self.ring.peek_at(0) }
    }

    /// Iterate over the buffered elements, oldest first
    ///
    /// The length is fixed when the iterator is created; elements pushed
    /// afterwards are not visited.
    pub fn iter(&self) -> Iter<'_, T, N> {
        Iter {
            ring: self.ring,
            offset: 0,
            len: self.ring.len(),
        }
    }

    /// Check if the most recently buffered elements equal `pattern`
    ///
    /// Nothing is consumed. An empty pattern always matches.
    pub fn ends_with(&self, pattern: &[T]) -> bool
    where
        T: PartialEq,
    {
        let len = self.ring.len();
        if pattern.len() > len {
            return false;
        }

        let start = len - pattern.len();
        pattern.iter().enumerate().all(|(i, expected)| {
            // SAFETY: see `peek`.
            let actual = unsafe { self.ring.peek_at(start + i) };
            actual == Some(expected)
        })
    }

    /// Number of buffered elements
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Check if no element is buffered
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Check if every slot is occupied
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Maximum number of elements
    pub fn capacity(&self) -> usize {
        N
    }
}

/// Iterator over a consumer's buffered elements
pub struct Iter<'a, T, const N: usize> {
    ring: &'a RingBuffer<T, N>,
    offset: usize,
    len: usize,
}

impl<'a, T, const N: usize> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.len {
            return None;
        }
        // SAFETY: the iterator borrows the consumer, so no pop can happen
        // while it is alive; `offset < len <= count`.
        let item = unsafe { self.ring.peek_at(self.offset) };
        self.offset += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.offset;
        (remaining, Some(remaining))
    }
}

impl<'a, T, const N: usize> ExactSizeIterator for Iter<'a, T, N> {}
