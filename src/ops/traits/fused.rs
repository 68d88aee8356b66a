//! Fused two-stage operation traits.
//!
//! The second stage (reduce or filter) always sees the mapped element. The
//! mapped intermediate is never handed to the caller.

use crate::algorithm::{Filter, Map, MutatingMap, Reduce};
use crate::error::Result;
use crate::runtime::{BackendClient, HostAllocator, LaunchConfig};

/// Map then reduce, element types differ
pub trait MapReduceOps<Alg, T, A>: BackendClient
where
    Alg: Map<T, A> + Reduce<<Alg as Map<T, A>>::Output>,
{
    /// Reduce `alg.map(x, args)` over every `x` in `data`
    fn parallel_map_reduce<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<Alg::Output>;
}

/// Map in place then reduce
pub trait MapInPlaceReduceOps<Alg, T, A>: BackendClient
where
    Alg: MutatingMap<T, A> + Reduce<T>,
{
    /// Reduce the in-place mapped elements of `data`
    ///
    /// The caller's `data` is left untouched; the in-place map runs on a
    /// staged copy.
    fn parallel_map_in_place_reduce<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<T>;
}

/// Map then filter, element types differ
pub trait MapFilterOps<Alg, T, A>: BackendClient
where
    Alg: Map<T, A> + Filter<<Alg as Map<T, A>>::Output>,
{
    /// Keep the mapped elements accepted by `alg.filter`
    fn parallel_map_filter<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<Vec<Alg::Output>>;
}

/// Map in place then filter
pub trait MapInPlaceFilterOps<Alg, T, A>: BackendClient
where
    Alg: MutatingMap<T, A> + Filter<T>,
{
    /// Keep the in-place mapped elements accepted by `alg.filter`
    ///
    /// The caller's `data` is left untouched.
    fn parallel_map_in_place_filter<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<Vec<T>>;
}
