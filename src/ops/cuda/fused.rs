//! CUDA implementation of fused map-reduce and map-filter operations.

use crate::algorithm::{DeviceKernel, Filter, Map, MutatingMap, Reduce};
use crate::dtype::DeviceElement;
use crate::error::Result;
use crate::ops::{MapFilterOps, MapInPlaceFilterOps, MapInPlaceReduceOps, MapReduceOps};
use crate::runtime::cuda::CudaClient;
use crate::runtime::cuda::kernels::{KernelPlan, launch_filter, launch_reduce};
use crate::runtime::{HostAllocator, LaunchConfig, allocate_output};

/// MapReduceOps implementation for CUDA runtime.
impl<Alg, T, A> MapReduceOps<Alg, T, A> for CudaClient
where
    Alg: Map<T, A> + Reduce<<Alg as Map<T, A>>::Output> + DeviceKernel,
    Alg::Output: DeviceElement,
    T: DeviceElement,
    A: DeviceElement,
{
    fn parallel_map_reduce<M: HostAllocator>(
        &self,
        alg: &Alg,
        _alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<Alg::Output> {
        tracing::debug!(size = data.len(), "cuda map-reduce");
        launch_reduce(
            self,
            alg,
            KernelPlan::MAP_REDUCE,
            cfg,
            data,
            args,
            alg.identity(),
        )
    }
}

/// MapInPlaceReduceOps implementation for CUDA runtime.
impl<Alg, T, A> MapInPlaceReduceOps<Alg, T, A> for CudaClient
where
    Alg: MutatingMap<T, A> + Reduce<T> + DeviceKernel,
    T: DeviceElement,
    A: DeviceElement,
{
    fn parallel_map_in_place_reduce<M: HostAllocator>(
        &self,
        alg: &Alg,
        _alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<T> {
        tracing::debug!(size = data.len(), "cuda map-in-place-reduce");
        launch_reduce(
            self,
            alg,
            KernelPlan::MAP_IN_PLACE_REDUCE,
            cfg,
            data,
            args,
            alg.identity(),
        )
    }
}

/// MapFilterOps implementation for CUDA runtime.
impl<Alg, T, A> MapFilterOps<Alg, T, A> for CudaClient
where
    Alg: Map<T, A> + Filter<<Alg as Map<T, A>>::Output> + DeviceKernel,
    Alg::Output: DeviceElement,
    T: DeviceElement,
    A: DeviceElement,
{
    fn parallel_map_filter<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<Vec<Alg::Output>> {
        let mut out = allocate_output::<Alg::Output, M>(alloc, data.len())?;
        launch_filter(self, alg, KernelPlan::MAP_FILTER, cfg, data, args, &mut out)?;
        Ok(out)
    }
}

/// MapInPlaceFilterOps implementation for CUDA runtime.
impl<Alg, T, A> MapInPlaceFilterOps<Alg, T, A> for CudaClient
where
    Alg: MutatingMap<T, A> + Filter<T> + DeviceKernel,
    T: DeviceElement,
    A: DeviceElement,
{
    fn parallel_map_in_place_filter<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<Vec<T>> {
        let mut out = allocate_output::<T, M>(alloc, data.len())?;
        launch_filter(
            self,
            alg,
            KernelPlan::MAP_IN_PLACE_FILTER,
            cfg,
            data,
            args,
            &mut out,
        )?;
        Ok(out)
    }
}
