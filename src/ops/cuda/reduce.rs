//! CUDA implementation of reduce operations.

use crate::algorithm::{DeviceKernel, Reduce};
use crate::dtype::DeviceElement;
use crate::error::Result;
use crate::ops::ReduceOps;
use crate::runtime::cuda::CudaClient;
use crate::runtime::cuda::kernels::{KernelPlan, launch_reduce};
use crate::runtime::{HostAllocator, LaunchConfig};

/// ReduceOps implementation for CUDA runtime.
///
/// Each thread folds its grid-stride elements from the device identity,
/// blocks combine their threads in shared memory and one thread per block
/// folds the block partial into the accumulator under a device lock. The
/// accumulator itself starts from the host-side `identity()`.
impl<Alg, R> ReduceOps<Alg, R> for CudaClient
where
    Alg: Reduce<R> + DeviceKernel,
    R: DeviceElement,
{
    fn parallel_reduce<M: HostAllocator>(
        &self,
        alg: &Alg,
        _alloc: &M,
        cfg: &LaunchConfig,
        data: &[R],
    ) -> Result<R> {
        tracing::debug!(size = data.len(), "cuda reduce");
        launch_reduce(
            self,
            alg,
            KernelPlan::REDUCE,
            cfg,
            data,
            &(),
            alg.identity(),
        )
    }
}
