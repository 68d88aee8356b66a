//! Host implementation of fused map-reduce and map-filter operations.

use super::{compact_indices, fold_indices};
use crate::algorithm::{Filter, Map, MutatingMap, Reduce};
use crate::error::Result;
use crate::ops::{MapFilterOps, MapInPlaceFilterOps, MapInPlaceReduceOps, MapReduceOps};
use crate::runtime::host::HostClient;
use crate::runtime::{HostAllocator, LaunchConfig};

/// MapReduceOps implementation for host runtime.
impl<Alg, T, A> MapReduceOps<Alg, T, A> for HostClient
where
    Alg: Map<T, A> + Reduce<<Alg as Map<T, A>>::Output> + Sync,
    Alg::Output: Send,
    T: Sync,
    A: Sync,
{
    fn parallel_map_reduce<M: HostAllocator>(
        &self,
        alg: &Alg,
        _alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<Alg::Output> {
        tracing::debug!(size = data.len(), "host map-reduce");
        Ok(fold_indices(self, alg, cfg, data.len(), |alg, acc, i| {
            alg.reduce(acc, &alg.map(&data[i], args))
        }))
    }
}

/// MapInPlaceReduceOps implementation for host runtime.
impl<Alg, T, A> MapInPlaceReduceOps<Alg, T, A> for HostClient
where
    Alg: MutatingMap<T, A> + Reduce<T> + Sync,
    T: Clone + Send + Sync,
    A: Sync,
{
    fn parallel_map_in_place_reduce<M: HostAllocator>(
        &self,
        alg: &Alg,
        _alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<T> {
        tracing::debug!(size = data.len(), "host map-in-place-reduce");
        Ok(fold_indices(self, alg, cfg, data.len(), |alg, acc, i| {
            // each worker stages its own element
            let mut item = data[i].clone();
            alg.map_in_place(&mut item, args);
            alg.reduce(acc, &item)
        }))
    }
}

/// MapFilterOps implementation for host runtime.
impl<Alg, T, A> MapFilterOps<Alg, T, A> for HostClient
where
    Alg: Map<T, A> + Filter<<Alg as Map<T, A>>::Output> + Sync,
    Alg::Output: Send,
    T: Sync,
    A: Sync,
{
    fn parallel_map_filter<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<Vec<Alg::Output>> {
        let out = compact_indices(self, alloc, cfg, data.len(), |i| {
            let mapped = alg.map(&data[i], args);
            alg.filter(&mapped).then_some(mapped)
        })?;
        tracing::debug!(size = data.len(), accepted = out.len(), "host map-filter");
        Ok(out)
    }
}

/// MapInPlaceFilterOps implementation for host runtime.
impl<Alg, T, A> MapInPlaceFilterOps<Alg, T, A> for HostClient
where
    Alg: MutatingMap<T, A> + Filter<T> + Sync,
    T: Clone + Send + Sync,
    A: Sync,
{
    fn parallel_map_in_place_filter<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<Vec<T>> {
        let out = compact_indices(self, alloc, cfg, data.len(), |i| {
            let mut item = data[i].clone();
            alg.map_in_place(&mut item, args);
            alg.filter(&item).then_some(item)
        })?;
        tracing::debug!(
            size = data.len(),
            accepted = out.len(),
            "host map-in-place-filter"
        );
        Ok(out)
    }
}
