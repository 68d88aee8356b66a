//! CUDA Device implementation

use crate::runtime::Device;

/// CUDA device identified by its ordinal
///
/// A device value is only a handle; the context and stream live in the
/// [`CudaClient`](super::CudaClient) created for it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CudaDevice {
    /// Index of the GPU device (0, 1, 2, ...)
    pub(crate) index: usize,
}

impl CudaDevice {
    /// Create a new CUDA device
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    /// Ordinal of this device
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Device for CudaDevice {
    fn id(&self) -> usize {
        self.index
    }

    fn name(&self) -> String {
        format!("cuda:{}", self.index)
    }
}

impl Default for CudaDevice {
    fn default() -> Self {
        Self::new(0)
    }
}
