//! # offload
//!
//! **Write a per-element algorithm once, run it on the host worker pool or on
//! a CUDA device.**
//!
//! offload is an execution layer for data-parallel work. An algorithm is a
//! plain value implementing one or more capability traits (a transform, a
//! predicate, a combine). A backend stages the input, launches one logical
//! thread per element, compacts or reduces the results and hands back a
//! host-resident collection or scalar.
//!
//! ## Shapes
//!
//! - **map / map in place**: transform every element
//! - **filter**: keep accepted elements, packed with an atomic slot counter
//! - **reduce**: fold every element into an explicit identity
//! - **map-reduce / map-filter**: the fused two-stage forms
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use offload::prelude::*;
//!
//! struct Square;
//!
//! impl Map<f64> for Square {
//!     type Output = f64;
//!     fn map(&self, x: &f64, _: &()) -> f64 {
//!         x * x
//!     }
//! }
//!
//! impl Reduce<f64> for Square {
//!     fn identity(&self) -> f64 {
//!         0.0
//!     }
//!     fn reduce(&self, acc: &mut f64, partial: &f64) {
//!         *acc += partial;
//!     }
//! }
//!
//! let client = HostBackend::default_client(&HostBackend::default_device())?;
//! let data = vec![1.0, 2.0, 3.0];
//! let sum_sq = offload::ops::map_reduce(&client, &Square, &DefaultAllocator, None, &data, &())?;
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): multi-core host backend on a rayon pool
//! - `cuda`: NVIDIA CUDA backend, kernels generated and compiled with NVRTC

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod algorithm;
pub mod dtype;
pub mod error;
pub mod ops;
pub mod runtime;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithm::{
        DeviceKernel, Filter, FilterShape, Map, MapFilterShape, MapReduceShape, MapShape,
        MutatingMap, MutatingMapFilterShape, MutatingMapReduceShape, MutatingMapShape,
        Parallelizable, Reduce, ReduceShape,
    };
    pub use crate::dtype::DeviceElement;
    pub use crate::error::{Error, Result};
    pub use crate::runtime::{
        Backend, BackendClient, DefaultAllocator, Device, HostAllocator, LaunchConfig,
        TrackingAllocator,
    };

    #[cfg(feature = "cpu")]
    pub use crate::runtime::host::{HostBackend, HostClient, HostDevice};

    #[cfg(feature = "cuda")]
    pub use crate::runtime::cuda::{CudaBackend, CudaClient, CudaDevice};
}

/// Default backend based on enabled features
///
/// - With `cuda` feature: `CudaBackend`
/// - Otherwise: `HostBackend`
#[cfg(feature = "cuda")]
pub type DefaultBackend = runtime::cuda::CudaBackend;

/// Default backend based on enabled features
#[cfg(all(feature = "cpu", not(feature = "cuda")))]
pub type DefaultBackend = runtime::host::HostBackend;
