//! Device-side bodies for algorithms that run on the GPU backend
//!
//! Rust closures cannot execute on a CUDA device, so an algorithm that
//! wants to run there also supplies the CUDA C++ bodies of the capability
//! functions it implements. The backend wraps them in generated kernels
//! (grid-stride loops, the compaction counter, the reduction tree), so the
//! source only contains the per-element logic.
//!
//! # Source contract
//!
//! The generated module emits each type's `DeviceElement::CUDA_DECL`,
//! then declares these typedefs before `SOURCE`:
//!
//! | typedef   | meaning                                            |
//! |-----------|----------------------------------------------------|
//! | `in_t`    | input element type                                 |
//! | `out_t`   | mapped element type (`in_t` for in-place shapes)   |
//! | `args_t`  | extra argument type (`offload_unit_t` for `()`)    |
//! | `state_t` | [`DeviceKernel::State`]                            |
//!
//! and expects the device functions needed by the requested shape:
//!
//! ```text
//! __device__ out_t map(const state_t& self, const in_t& x, const args_t& args);
//! __device__ void  map_in_place(const state_t& self, in_t& x, const args_t& args);
//! __device__ bool  filter(const state_t& self, const out_t& x);
//! __device__ out_t identity(const state_t& self);
//! __device__ void  reduce(const state_t& self, out_t* acc, const out_t& partial);
//! ```
//!
//! For plain filter and reduce calls `in_t` and `out_t` are both the
//! element type, and `args_t` is `offload_unit_t`.
//!
//! The whole source is compiled for every shape the algorithm runs as. A
//! function that does arithmetic on `args` can be written as a template
//! over the argument type so shapes that never call it do not
//! instantiate it:
//!
//! ```text
//! template <typename Args>
//! __device__ void map_in_place(const state_t&, in_t& x, const Args& k) { x += k; }
//! ```
//!
//! # Example
//!
//! ```ignore
//! struct Halve;
//!
//! impl DeviceKernel for Halve {
//!     type State = ();
//!     const SOURCE: &'static str = r#"
//!         __device__ out_t map(const state_t&, const in_t& x, const args_t&) {
//!             return x * 0.5;
//!         }
//!     "#;
//!     fn state(&self) {}
//! }
//! ```

use crate::dtype::DeviceElement;

/// CUDA C++ bodies of an algorithm's capability functions
pub trait DeviceKernel: 'static {
    /// Read-only algorithm state copied byte-for-byte to the device
    ///
    /// Use `()` for stateless algorithms.
    type State: DeviceElement;

    /// Device functions implementing the algorithm's capabilities
    const SOURCE: &'static str;

    /// Snapshot of the state passed to every kernel invocation
    fn state(&self) -> Self::State;
}
