//! Operation traits for the parallel shapes.
//!
//! This module contains one trait per operation shape. Implementations are
//! in the backend-specific modules (host/, cuda/), each adding the element
//! bounds its backend needs (`Send + Sync` for host workers,
//! [`DeviceElement`](crate::dtype::DeviceElement) for the GPU).

mod filter;
mod fused;
mod map;
mod reduce;

pub use filter::FilterOps;
pub use fused::{MapFilterOps, MapInPlaceFilterOps, MapInPlaceReduceOps, MapReduceOps};
pub use map::{MapInPlaceOps, MapOps};
pub use reduce::ReduceOps;
