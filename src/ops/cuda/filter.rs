//! CUDA implementation of filter operations.

use crate::algorithm::{DeviceKernel, Filter};
use crate::dtype::DeviceElement;
use crate::error::Result;
use crate::ops::FilterOps;
use crate::runtime::cuda::CudaClient;
use crate::runtime::cuda::kernels::{KernelPlan, launch_filter};
use crate::runtime::{HostAllocator, LaunchConfig, allocate_output};

/// FilterOps implementation for CUDA runtime.
impl<Alg, T> FilterOps<Alg, T> for CudaClient
where
    Alg: Filter<T> + DeviceKernel,
    T: DeviceElement,
{
    fn parallel_filter<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
    ) -> Result<Vec<T>> {
        let mut out = allocate_output::<T, M>(alloc, data.len())?;
        launch_filter(self, alg, KernelPlan::FILTER, cfg, data, &(), &mut out)?;
        Ok(out)
    }
}
