//! Backend traits for parallel execution abstraction

pub mod backend;
pub mod client;
pub mod device;

pub use backend::Backend;
pub use client::BackendClient;
pub use device::Device;
