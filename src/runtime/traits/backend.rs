//! Core trait for execution backends

use super::{BackendClient, Device};
use crate::error::Result;

/// Core trait for execution backends
///
/// `Backend` abstracts over where per-element work runs (host worker pool,
/// CUDA device). It is only used for static dispatch: which backends exist
/// is decided by cargo features, never by a runtime branch.
///
/// # Associated Types
///
/// - `Device`: Identifies a specific compute unit (e.g., GPU 0)
/// - `Client`: Stages buffers and launches kernels on that device
///
/// # Example
///
/// ```ignore
/// let device = HostBackend::default_device();
/// let client = HostBackend::default_client(&device)?;
/// let doubled = offload::ops::map(&client, &Doubler, &DefaultAllocator, None, &data, &())?;
/// ```
pub trait Backend: Clone + Send + Sync + 'static {
    /// Device identifier type
    type Device: Device;

    /// Client for launching work
    type Client: BackendClient<Backend = Self>;

    /// Human-readable name of this backend
    fn name() -> &'static str;

    /// Whether the backend can run on this machine
    fn is_available() -> bool {
        true
    }

    /// Get the default device
    fn default_device() -> Self::Device;

    /// Get a client for a device
    fn default_client(device: &Self::Device) -> Result<Self::Client>;
}
