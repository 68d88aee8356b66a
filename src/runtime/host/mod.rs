//! Host runtime implementation
//!
//! The host backend treats the local multi-core CPU as the offload target.
//! Work runs on a rayon thread pool owned by the [`HostDevice`].
//!
//! # Staging
//!
//! Workers can read host memory directly, so read-only inputs are never
//! copied: staging and destaging are no-ops. Only results are allocated,
//! through the caller's allocator.
//!
//! # Launch geometry
//!
//! A [`LaunchConfig`](crate::runtime::LaunchConfig) is mapped onto a
//! two-level fan-out: the index space is split into `group_count`
//! contiguous team ranges, and each team range into `threads_per_group`
//! thread ranges. Every range is a rayon task; the call returns once all
//! of them have finished.

mod client;
mod device;
pub(crate) mod kernels;
mod runtime;

pub use client::HostClient;
pub use device::HostDevice;
pub use runtime::HostBackend;
