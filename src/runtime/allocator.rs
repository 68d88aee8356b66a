//! Host memory allocators for result collections
//!
//! Backends never pick an allocation policy themselves: every host-visible
//! collection a call returns is obtained from the [`HostAllocator`] the
//! caller passes in. Allocation failures are reported as
//! [`Error::OutOfMemory`] instead of aborting the process.

use crate::error::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Memory allocator trait for host-resident results
pub trait HostAllocator: Clone + Send + Sync {
    /// Allocate an empty vector able to hold `len` elements without
    /// reallocating
    fn allocate<T>(&self, len: usize) -> Result<Vec<T>>;

    /// Get the total allocated bytes
    fn allocated_bytes(&self) -> usize {
        0 // Default: tracking not supported
    }
}

/// Allocate a result collection and check the allocator kept its contract
///
/// Drivers write through the reserved capacity, so a vector that is not
/// empty or is short of `len` slots is refused here instead of panicking
/// mid-launch.
pub(crate) fn allocate_output<T, M: HostAllocator>(alloc: &M, len: usize) -> Result<Vec<T>> {
    let out = alloc.allocate::<T>(len)?;
    if !out.is_empty() || out.capacity() < len {
        return Err(Error::Internal(format!(
            "allocator returned {} elements with capacity {}, expected an empty vector for {len}",
            out.len(),
            out.capacity()
        )));
    }
    Ok(out)
}

/// Reserve exactly `len` slots, mapping failure to `OutOfMemory`
fn reserve<T>(len: usize) -> Result<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| Error::out_of_memory::<T>(len))?;
    Ok(out)
}

/// Default allocator backed by the global heap
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultAllocator;

impl HostAllocator for DefaultAllocator {
    fn allocate<T>(&self, len: usize) -> Result<Vec<T>> {
        reserve(len)
    }
}

/// Allocator that counts the bytes it hands out and can enforce a budget
///
/// The count is cumulative: collections are freed by their owners, so it
/// reports how much a sequence of calls requested, not what is live. Clones
/// share the same counter.
#[derive(Clone, Debug, Default)]
pub struct TrackingAllocator {
    allocated: Arc<AtomicUsize>,
    limit: Option<usize>,
}

impl TrackingAllocator {
    /// Create an allocator without a budget
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an allocator that fails once `limit` bytes have been handed out
    pub fn with_limit(limit: usize) -> Self {
        Self {
            allocated: Arc::new(AtomicUsize::new(0)),
            limit: Some(limit),
        }
    }

    /// Forget everything counted so far
    pub fn reset(&self) {
        self.allocated.store(0, Ordering::Relaxed);
    }
}

impl HostAllocator for TrackingAllocator {
    fn allocate<T>(&self, len: usize) -> Result<Vec<T>> {
        let bytes = len.saturating_mul(std::mem::size_of::<T>());
        let previous = self.allocated.fetch_add(bytes, Ordering::Relaxed);
        if let Some(limit) = self.limit {
            if previous.saturating_add(bytes) > limit {
                self.allocated.fetch_sub(bytes, Ordering::Relaxed);
                tracing::debug!(bytes, limit, "allocation refused by budget");
                return Err(Error::OutOfMemory { size: bytes });
            }
        }
        reserve(len).inspect_err(|_| {
            self.allocated.fetch_sub(bytes, Ordering::Relaxed);
        })
    }

    fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allocator_trait_bounds() {
        fn assert_allocator<A: HostAllocator>() {}
        assert_allocator::<DefaultAllocator>();
        assert_allocator::<TrackingAllocator>();
    }

    #[test]
    fn test_default_allocator_reserves_capacity() {
        let v: Vec<u32> = DefaultAllocator.allocate(100).unwrap();
        assert!(v.is_empty());
        assert!(v.capacity() >= 100);
    }

    #[test]
    fn test_default_allocator_reports_oom() {
        let err = DefaultAllocator.allocate::<u64>(usize::MAX / 2).unwrap_err();
        assert!(matches!(err, Error::OutOfMemory { .. }));
    }

    #[derive(Clone)]
    struct Stingy;

    impl HostAllocator for Stingy {
        fn allocate<T>(&self, _len: usize) -> Result<Vec<T>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_allocate_output_rejects_short_capacity() {
        let err = allocate_output::<u64, _>(&Stingy, 8).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
        // zero-length requests are satisfied by an empty vector
        assert!(allocate_output::<u64, _>(&Stingy, 0).unwrap().is_empty());
        assert!(allocate_output::<u64, _>(&DefaultAllocator, 8).unwrap().capacity() >= 8);
    }

    #[test]
    fn test_tracking_allocator_counts_bytes() {
        let alloc = TrackingAllocator::new();
        let _a: Vec<f64> = alloc.allocate(10).unwrap();
        let _b: Vec<u8> = alloc.clone().allocate(3).unwrap();
        assert_eq!(alloc.allocated_bytes(), 83);
        alloc.reset();
        assert_eq!(alloc.allocated_bytes(), 0);
    }

    #[test]
    fn test_tracking_allocator_enforces_limit() {
        let alloc = TrackingAllocator::with_limit(16);
        let _ok: Vec<u32> = alloc.allocate(4).unwrap();
        let err = alloc.allocate::<u32>(1).unwrap_err();
        assert!(matches!(err, Error::OutOfMemory { size: 4 }));
        // refused requests are not counted
        assert_eq!(alloc.allocated_bytes(), 16);
    }
}
