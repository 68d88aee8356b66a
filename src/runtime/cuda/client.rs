//! CUDA Client implementation
//!
//! CudaClient owns the context and stream every call of a device runs on,
//! and provides the staging helpers the drivers use to move collections
//! between host and device memory.

use cudarc::driver::safe::{CudaContext, CudaSlice, CudaStream};
use cudarc::driver::{DeviceRepr, DriverError, ValidAsZeroBits, sys::CUresult};
use std::sync::Arc;

use super::CudaBackend;
use super::device::CudaDevice;
use super::kernels::BLOCK_SIZE;
use crate::dtype::DeviceElement;
use crate::error::{Error, Result};
use crate::runtime::{BackendClient, LaunchConfig};

/// Map an allocation failure to `OutOfMemory`, anything else to `Cuda`
fn alloc_error(err: DriverError, bytes: usize) -> Error {
    if err.0 == CUresult::CUDA_ERROR_OUT_OF_MEMORY {
        Error::OutOfMemory { size: bytes }
    } else {
        Error::Cuda(err)
    }
}

/// CUDA backend client
///
/// All kernels and copies of this client are issued on `self.stream()`,
/// which orders them.
#[derive(Clone)]
pub struct CudaClient {
    /// GPU device index
    pub(crate) device: CudaDevice,

    /// CUDA context for this device
    pub(crate) context: Arc<CudaContext>,

    /// Stream on which all kernels launch
    pub(crate) stream: Arc<CudaStream>,
}

impl std::fmt::Debug for CudaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CudaClient")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl CudaClient {
    /// Create a new CUDA client for a device.
    ///
    /// # Errors
    ///
    /// Returns an error if context or stream creation fails (e.g. invalid
    /// device ordinal).
    pub fn new(device: CudaDevice) -> Result<Self> {
        let context = CudaContext::new(device.index)?;
        let stream = context.new_stream()?;
        tracing::debug!(device = device.index, "cuda client ready");
        Ok(Self {
            device,
            context,
            stream,
        })
    }

    /// Get reference to the CUDA stream.
    #[inline]
    pub fn stream(&self) -> &Arc<CudaStream> {
        &self.stream
    }

    /// Get reference to the CUDA context.
    #[inline]
    pub fn context(&self) -> &Arc<CudaContext> {
        &self.context
    }

    /// Copy a collection into a fresh device buffer
    pub(crate) fn stage<T: DeviceElement>(&self, data: &[T]) -> Result<CudaSlice<u8>> {
        if size_of::<T>() == 0 {
            return Err(Error::invalid_argument(
                "data",
                "zero-sized elements cannot be staged to a device",
            ));
        }
        let bytes: &[u8] = bytemuck::cast_slice(data);
        tracing::trace!(bytes = bytes.len(), "stage to device");
        self.stream
            .clone_htod(bytes)
            .map_err(|e| alloc_error(e, bytes.len()))
    }

    /// Copy one value into a fresh device buffer
    ///
    /// Zero-sized values (`()`) become the one-byte placeholder kernels
    /// expect.
    pub(crate) fn stage_value<T: DeviceElement>(&self, value: &T) -> Result<CudaSlice<u8>> {
        if size_of::<T>() == 0 {
            return self.alloc_bytes(1);
        }
        let bytes = bytemuck::bytes_of(value);
        self.stream
            .clone_htod(bytes)
            .map_err(|e| alloc_error(e, bytes.len()))
    }

    /// Allocate `bytes` zeroed bytes of device memory
    pub(crate) fn alloc_bytes(&self, bytes: usize) -> Result<CudaSlice<u8>> {
        self.stream
            .alloc_zeros::<u8>(bytes.max(1))
            .map_err(|e| alloc_error(e, bytes))
    }

    /// Allocate a zeroed device buffer of `len` elements of `T`
    pub(crate) fn alloc_zeros<T>(&self, len: usize) -> Result<CudaSlice<T>>
    where
        T: DeviceRepr + ValidAsZeroBits,
    {
        self.stream
            .alloc_zeros::<T>(len.max(1))
            .map_err(|e| alloc_error(e, len.saturating_mul(size_of::<T>())))
    }

    /// Copy the leading bytes of `src` back into `out`
    pub(crate) fn destage<T: DeviceElement>(
        &self,
        src: &CudaSlice<u8>,
        out: &mut [T],
    ) -> Result<()> {
        if size_of::<T>() == 0 {
            return Ok(());
        }
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(out);
        if bytes.is_empty() {
            return Ok(());
        }
        if bytes.len() > src.len() {
            return Err(Error::Internal(format!(
                "destage of {} bytes from a {} byte device buffer",
                bytes.len(),
                src.len()
            )));
        }
        tracing::trace!(bytes = bytes.len(), "destage to host");
        let view = src.slice(0..bytes.len());
        self.stream.memcpy_dtoh(&view, bytes)?;
        self.stream.synchronize()?;
        Ok(())
    }
}

impl BackendClient for CudaClient {
    type Backend = CudaBackend;

    fn device(&self) -> &CudaDevice {
        &self.device
    }

    fn synchronize(&self) -> Result<()> {
        self.stream.synchronize()?;
        Ok(())
    }

    /// One thread per element in blocks of [`BLOCK_SIZE`].
    fn default_config(&self, size: usize) -> LaunchConfig {
        LaunchConfig::for_size(size, BLOCK_SIZE)
    }
}
