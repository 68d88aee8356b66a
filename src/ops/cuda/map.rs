//! CUDA implementation of map operations.

use crate::algorithm::{DeviceKernel, Map, MutatingMap};
use crate::dtype::DeviceElement;
use crate::error::Result;
use crate::ops::{MapInPlaceOps, MapOps};
use crate::runtime::cuda::CudaClient;
use crate::runtime::cuda::kernels::{KernelPlan, launch_map, launch_map_in_place};
use crate::runtime::{HostAllocator, LaunchConfig, allocate_output};

/// MapOps implementation for CUDA runtime.
impl<Alg, T, A> MapOps<Alg, T, A> for CudaClient
where
    Alg: Map<T, A> + DeviceKernel,
    Alg::Output: DeviceElement,
    T: DeviceElement,
    A: DeviceElement,
{
    fn parallel_map<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<Vec<Alg::Output>> {
        tracing::debug!(
            size = data.len(),
            groups = cfg.group_count(),
            threads = cfg.threads_per_group(),
            "cuda map"
        );
        let mut out = allocate_output::<Alg::Output, M>(alloc, data.len())?;
        out.resize(data.len(), bytemuck::Zeroable::zeroed());
        launch_map(self, alg, KernelPlan::MAP, cfg, data, args, &mut out)?;
        Ok(out)
    }
}

/// MapInPlaceOps implementation for CUDA runtime.
///
/// The collection is staged, transformed on the device and destaged back
/// into the caller's slice.
impl<Alg, T, A> MapInPlaceOps<Alg, T, A> for CudaClient
where
    Alg: MutatingMap<T, A> + DeviceKernel,
    T: DeviceElement,
    A: DeviceElement,
{
    fn parallel_map_in_place<M: HostAllocator>(
        &self,
        alg: &Alg,
        _alloc: &M,
        cfg: &LaunchConfig,
        data: &mut [T],
        args: &A,
    ) -> Result<()> {
        tracing::debug!(size = data.len(), "cuda map in place");
        launch_map_in_place(self, alg, cfg, data, args)
    }
}
