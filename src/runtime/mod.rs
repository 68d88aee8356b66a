//! Execution backends
//!
//! This module defines the `Backend` trait and provides implementations
//! for the supported targets (multi-core host, CUDA).
//!
//! # Architecture
//!
//! ```text
//! Backend (target identity, selected by cargo feature)
//! ├── Device (identifies a worker pool or a GPU)
//! ├── Client (stages buffers, launches kernels, synchronizes)
//! ├── LaunchConfig (group / thread geometry of one launch)
//! └── CompactionBuffer (atomic-slot packing for filter shapes)
//! ```
//!
//! Result collections are obtained from a caller supplied
//! [`HostAllocator`]; device-side buffers belong to the client for the
//! duration of one call and are released on every exit path.

mod allocator;
pub mod compaction;
mod launch;
mod traits;

#[cfg(feature = "cpu")]
pub mod host;

#[cfg(feature = "cuda")]
pub mod cuda;

pub use allocator::{DefaultAllocator, HostAllocator, TrackingAllocator};
pub(crate) use allocator::allocate_output;
pub use compaction::{CompactionBuffer, CompactionWriter, GlobalIndex};
pub use launch::LaunchConfig;
pub use traits::{Backend, BackendClient, Device};
