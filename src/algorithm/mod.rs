//! Algorithm contracts
//!
//! A user algorithm is an ordinary value implementing one or more
//! capability traits. Backends run it unchanged; the composer picks the
//! primitive from the shape the algorithm declares.
//!
//! - [`capability`]: `Map`, `MutatingMap`, `Filter`, `Reduce`
//! - [`shape`]: shape markers, [`Parallelizable`] and [`Route`]
//! - [`device`]: CUDA bodies for algorithms that also run on the GPU

pub mod capability;
pub mod device;
pub mod shape;

pub use capability::{Filter, Map, MutatingMap, Reduce};
pub use device::DeviceKernel;
pub use shape::{
    FilterShape, MapFilterShape, MapReduceShape, MapShape, MutatingMapFilterShape,
    MutatingMapReduceShape, MutatingMapShape, Parallelizable, ReduceShape, Route, Shape,
};
