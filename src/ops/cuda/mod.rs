//! CUDA implementation of the parallel shapes.
//!
//! This module contains the operation trait implementations for the CUDA
//! runtime. Algorithms must also implement
//! [`DeviceKernel`](crate::algorithm::DeviceKernel) and every element, args
//! and state type must be a [`DeviceElement`](crate::dtype::DeviceElement).
//! Fused shapes run as one kernel; the mapped intermediate only ever lives
//! in registers.

mod filter;
mod fused;
mod map;
mod reduce;
