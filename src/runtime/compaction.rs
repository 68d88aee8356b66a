//! Lock-free compaction for filter-shaped calls
//!
//! Workers that accept an element claim the next free slot of the output
//! with one indivisible fetch-and-add on a shared counter, then write the
//! element into that slot. Slots are handed out exactly once, so writers
//! never collide and no lock is taken. After the launch barrier the counter
//! holds the number of accepted elements, which becomes the result length.
//!
//! ```text
//! worker 3: accept ─ claim() → 0 ─ write out[0]
//! worker 0: accept ─ claim() → 1 ─ write out[1]
//! worker 1: reject
//! worker 2: accept ─ claim() → 2 ─ write out[2]
//!                                        count() == 3
//! ```
//!
//! The result order reflects which worker claimed first, not input order.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared monotonic slot counter
///
/// Starts at zero, is incremented exactly once per accepted element and is
/// never decremented.
#[derive(Debug, Default)]
pub struct GlobalIndex {
    next: AtomicUsize,
}

impl GlobalIndex {
    /// Create a counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the next slot
    ///
    /// Concurrent claims observe a linear, non-overlapping sequence.
    #[inline]
    pub fn claim(&self) -> usize {
        // Only uniqueness matters; the launch barrier publishes the writes.
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Claim the next slot only if it is below `limit`
    ///
    /// Once the counter reaches `limit` every further claim is refused and
    /// the counter stays put.
    #[inline]
    pub fn try_claim(&self, limit: usize) -> Option<usize> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
                (next < limit).then_some(next + 1)
            })
            .ok()
    }

    /// Number of slots claimed so far
    #[inline]
    pub fn count(&self) -> usize {
        self.next.load(Ordering::Acquire)
    }
}

/// Output buffer filled through a [`GlobalIndex`]
///
/// Wraps a vector with spare capacity for the worst case (every element
/// accepted). Workers push through a [`CompactionWriter`]; once the launch
/// has completed, [`CompactionBuffer::finish`] returns the packed result.
pub struct CompactionBuffer<T> {
    out: Vec<T>,
    slots: usize,
    index: GlobalIndex,
}

impl<T: Send> CompactionBuffer<T> {
    /// Wrap an empty vector; its capacity is the number of slots
    ///
    /// # Panics
    ///
    /// Panics if `out` is not empty.
    pub fn new(out: Vec<T>) -> Self {
        assert!(out.is_empty(), "compaction output must start empty");
        let slots = out.capacity();
        Self {
            out,
            slots,
            index: GlobalIndex::new(),
        }
    }

    /// Number of slots available
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Handle shared by all workers of one launch
    pub fn writer(&mut self) -> CompactionWriter<'_, T> {
        CompactionWriter {
            base: self.out.as_mut_ptr(),
            slots: self.slots,
            index: &self.index,
            _marker: PhantomData,
        }
    }

    /// Truncate to the accepted elements and return them
    pub fn finish(mut self) -> Vec<T> {
        // Writers only claim below `slots`; the clamp keeps `set_len` in
        // bounds even if the counter was bumped through `GlobalIndex` directly.
        let count = self.index.count().min(self.slots);
        // SAFETY: the writer borrowed `self` mutably, so every launch using it
        // has returned. Each claimed slot below `count` was written exactly
        // once by the worker that claimed it, and `count <= capacity`.
        unsafe { self.out.set_len(count) };
        self.out
    }
}

/// Concurrent push handle into a [`CompactionBuffer`]
pub struct CompactionWriter<'a, T> {
    base: *mut T,
    slots: usize,
    index: &'a GlobalIndex,
    _marker: PhantomData<&'a mut Vec<T>>,
}

// SAFETY: every push writes a slot obtained from an atomic claim, so no two
// threads ever touch the same element. Values move across threads, hence
// `T: Send`.
unsafe impl<T: Send> Send for CompactionWriter<'_, T> {}
unsafe impl<T: Send> Sync for CompactionWriter<'_, T> {}

impl<T> CompactionWriter<'_, T> {
    /// Append an accepted element in the next free slot
    ///
    /// # Panics
    ///
    /// Panics if more elements are pushed than the buffer has slots. The
    /// refused element is never counted, so the buffer stays usable.
    #[inline]
    pub fn push(&self, value: T) {
        let Some(slot) = self.index.try_claim(self.slots) else {
            panic!("compaction overflow: all {} slots taken", self.slots);
        };
        // SAFETY: `slot` is in bounds of the reserved capacity and was handed
        // out to this call only.
        unsafe { self.base.add(slot).write(value) };
    }
}
