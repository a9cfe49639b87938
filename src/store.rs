//! Shared byte store with per-slot readiness flags.

use crate::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use core::{cell::UnsafeCell, num::NonZeroUsize, ops::Range};
use crossbeam_utils::CachePadded;

/// Splits the cursor range `start..end` into at most two contiguous slot ranges.
///
/// Cursors are positions in `0..(2 * capacity)`, see [`RingStore`].
/// `start` must not be more than `capacity` behind `end`, i.e. `(end - start) mod (2 * capacity) <= capacity`,
/// otherwise the result is meaningless.
/// The second range is non-empty only when the data wraps past the end of the store.
pub fn runs(capacity: NonZeroUsize, start: usize, end: usize) -> (Range<usize>, Range<usize>) {
    let (head_quo, head_rem) = (start / capacity, start % capacity);
    let (tail_quo, tail_rem) = (end / capacity, end % capacity);

    if (head_quo + tail_quo) % 2 == 0 {
        (head_rem..tail_rem, 0..0)
    } else {
        (head_rem..capacity.get(), 0..tail_rem)
    }
}

/// Fixed-size byte array shared between producers and the drain task.
///
/// Besides the bytes it keeps a `filled` flag for every slot and two cursors.
/// A slot is filled from the moment a producer stored a byte in it until the drain task received the completion
/// for the run containing it.
///
/// Cursors are kept in range `0..(2 * N)` so that a full store (`write - read == N`) differs from an empty one
/// (`write == read`). The slot of a cursor is `cursor % N`.
///
/// *`N` must be greater than zero.*
pub struct RingStore<const N: usize> {
    buffer: [UnsafeCell<u8>; N],
    filled: [AtomicBool; N],
    write_cursor: CachePadded<AtomicUsize>,
    read_cursor: CachePadded<AtomicUsize>,
}

unsafe impl<const N: usize> Sync for RingStore<N> {}

impl<const N: usize> RingStore<N> {
    const NONZERO: () = assert!(N > 0 && N <= usize::MAX / 2, "capacity must be in range 1..=usize::MAX/2");

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let _ = Self::NONZERO;
        Self {
            buffer: [const { UnsafeCell::new(0) }; N],
            filled: [const { AtomicBool::new(false) }; N],
            write_cursor: CachePadded::new(AtomicUsize::new(0)),
            read_cursor: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    #[inline]
    pub fn capacity(&self) -> NonZeroUsize {
        unsafe { NonZeroUsize::new_unchecked(N) }
    }

    /// Modulus for cursors.
    ///
    /// Equals to `2 * capacity`.
    #[inline]
    pub fn modulus(&self) -> NonZeroUsize {
        unsafe { NonZeroUsize::new_unchecked(2 * N) }
    }

    #[inline]
    pub fn write_cursor(&self) -> usize {
        self.write_cursor.load(Ordering::Acquire)
    }
    #[inline]
    pub fn read_cursor(&self) -> usize {
        self.read_cursor.load(Ordering::Acquire)
    }
    #[inline]
    pub(crate) fn set_read_cursor(&self, value: usize) {
        self.read_cursor.store(value, Ordering::Release);
    }

    /// Cursor following `cursor`.
    #[inline]
    pub fn advance(&self, cursor: usize) -> usize {
        (cursor + 1) % self.modulus()
    }

    /// Number of bytes written but not yet consumed.
    pub fn occupied_len(&self) -> usize {
        let modulus = self.modulus().get();
        (modulus + self.write_cursor() - self.read_cursor()) % modulus
    }

    #[inline]
    pub fn is_filled(&self, slot: usize) -> bool {
        self.filled[slot].load(Ordering::Acquire)
    }

    /// Stores `byte` at the slot of `cursor`, marks the slot filled and publishes the next write cursor.
    ///
    /// # Safety
    ///
    /// Must be called by the only writer (the one holding the write lock), with `cursor` being the current write
    /// cursor whose slot is not filled.
    pub(crate) unsafe fn push(&self, cursor: usize, byte: u8) {
        let slot = cursor % N;
        debug_assert!(!self.is_filled(slot));
        *self.buffer[slot].get() = byte;
        self.filled[slot].store(true, Ordering::Release);
        self.write_cursor.store(self.advance(cursor), Ordering::Release);
    }

    /// Shared view of the bytes in `range`.
    ///
    /// # Safety
    ///
    /// All slots in `range` must be filled and stay filled while the returned slice is alive.
    pub(crate) unsafe fn slice(&self, range: Range<usize>) -> &[u8] {
        let cells = &self.buffer[range];
        core::slice::from_raw_parts(UnsafeCell::raw_get(cells.as_ptr()) as *const u8, cells.len())
    }

    /// Hands the slots in `range` back to producers.
    pub(crate) fn clear(&self, range: Range<usize>) {
        for flag in &self.filled[range] {
            flag.store(false, Ordering::Release);
        }
    }
}

impl<const N: usize> Default for RingStore<N> {
    fn default() -> Self {
        Self::new()
    }
}
