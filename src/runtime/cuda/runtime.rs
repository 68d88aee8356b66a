//! CUDA runtime implementation

use super::cache::get_or_create_client;
use super::client::CudaClient;
use super::device::CudaDevice;
use crate::error::Result;
use crate::runtime::Backend;

/// CUDA backend
///
/// Implements the generic Backend trait for NVIDIA GPUs through cudarc.
#[derive(Clone, Debug, Default)]
pub struct CudaBackend;

impl Backend for CudaBackend {
    type Device = CudaDevice;
    type Client = CudaClient;

    fn name() -> &'static str {
        "cuda"
    }

    fn is_available() -> bool {
        is_cuda_available()
    }

    fn default_device() -> Self::Device {
        cuda_device()
    }

    fn default_client(device: &Self::Device) -> Result<Self::Client> {
        get_or_create_client(device)
    }
}

/// Get the default CUDA device (device 0)
pub fn cuda_device() -> CudaDevice {
    CudaDevice::new(0)
}

/// Check if CUDA is available on this system
///
/// cudarc loads the driver library lazily and panics when it is missing,
/// so the probe runs under `catch_unwind`.
pub fn is_cuda_available() -> bool {
    std::panic::catch_unwind(|| get_or_create_client(&cuda_device()).is_ok()).unwrap_or(false)
}
