//! Ring Cursors
//!
//! Head/tail cursors over descriptor rings that live in the shared region
//! behind the [`MemoryPort`](crate::hal::MemoryPort). The descriptors
//! themselves are never held in host RAM, so unlike a conventional DMA ring
//! only the indices are tracked here; all descriptor access goes through the
//! port.
//!
//! Two conventions share this type:
//!
//! - **Transmit ring**: `head` is the next free slot, `tail` the oldest
//!   pending slot, `pending` disambiguates full from empty.
//! - **Receive rings**: `tail` is the next element the coprocessor will
//!   complete, `head` the element currently carrying the end-of-list flag.
//!   They stay in lockstep (`head == prev(tail)`) as elements are recycled.

/// Cursor over a ring of `N` descriptors.
#[derive(Debug, Clone, Copy)]
pub struct RingCursor<const N: usize> {
    /// Producer index (transmit) or end-of-list position (receive)
    pub(crate) head: usize,
    /// Consumer index
    pub(crate) tail: usize,
    /// Occupied slot count; unused by the receive convention
    pub(crate) pending: usize,
}

impl<const N: usize> RingCursor<N> {
    /// Creates a cursor with both indices at zero.
    pub const fn new() -> Self {
        Self {
            head: 0,
            tail: 0,
            pending: 0,
        }
    }

    /// True when every slot is pending (transmit convention).
    pub const fn is_full(&self) -> bool {
        self.pending == N
    }

    /// True when no slot is pending (transmit convention).
    pub const fn is_empty(&self) -> bool {
        self.pending == 0
    }

    /// The index preceding `idx`, wrapping at the ring boundary.
    pub const fn prev(idx: usize) -> usize {
        (idx + N - 1) % N
    }

    /// The index following `idx`, wrapping at the ring boundary.
    pub const fn next(idx: usize) -> usize {
        (idx + 1) % N
    }

    /// Claims the head slot and advances it (transmit convention).
    ///
    /// Caller must have checked [`is_full`](Self::is_full) first.
    pub fn push(&mut self) -> usize {
        let slot = self.head;
        self.head = Self::next(self.head);
        self.pending += 1;
        slot
    }

    /// Releases the tail slot and advances it (transmit convention).
    pub fn pop(&mut self) -> usize {
        let slot = self.tail;
        self.tail = Self::next(self.tail);
        self.pending -= 1;
        slot
    }

    /// Recycles the consumed tail element: it becomes the new end-of-list
    /// position and the consumer moves on (receive convention).
    pub fn recycle(&mut self) {
        self.head = self.tail;
        self.tail = Self::next(self.tail);
    }

    /// Resets to the post-initialization state for the receive convention:
    /// the end-of-list flag sits on the last element, consumption starts at
    /// zero.
    pub fn reset_rx(&mut self) {
        self.head = N - 1;
        self.tail = 0;
        self.pending = 0;
    }

    /// Resets to empty (transmit convention).
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.pending = 0;
    }
}

impl<const N: usize> Default for RingCursor<N> {
    fn default() -> Self {
        Self::new()
    }
}
