//! CUDA runtime implementation
//!
//! The CUDA backend runs algorithms on an NVIDIA GPU through cudarc.
//!
//! # Kernels
//!
//! Rust bodies cannot execute on the device, so algorithms opt in with
//! [`DeviceKernel`](crate::algorithm::DeviceKernel) and supply CUDA C++
//! device functions. For each (algorithm, shape, element types)
//! combination the backend generates wrapper kernels around those
//! functions, compiles them once with NVRTC and caches the module per
//! device.
//!
//! # Memory
//!
//! Every device buffer of a call (staged input, output, args, algorithm
//! state, compaction counter, reduction accumulator) is a `CudaSlice`
//! owned by that call. Dropping it frees device memory, so buffers are
//! released on every exit path, including errors.
//!
//! # Thread Safety
//!
//! `CudaClient` is `Clone` and can be shared across threads. The context
//! and stream are reference-counted; all work of a client is ordered on
//! its one stream.

mod cache;
mod client;
mod device;
pub(crate) mod kernels;
mod runtime;

pub use client::CudaClient;
pub use device::CudaDevice;
pub use kernels::BLOCK_SIZE;
pub use runtime::{CudaBackend, cuda_device, is_cuda_available};
