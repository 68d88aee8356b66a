//! Element types understood by the backends
//!
//! Host execution works with any `Send + Sync` value. The traits here add
//! what device execution needs on top of that.

mod element;

pub use element::DeviceElement;
