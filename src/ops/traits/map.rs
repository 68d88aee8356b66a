//! Map operation traits.

use crate::algorithm::{Map, MutatingMap};
use crate::error::Result;
use crate::runtime::{BackendClient, HostAllocator, LaunchConfig};

/// Element-to-new-element transform
pub trait MapOps<Alg, T, A>: BackendClient
where
    Alg: Map<T, A>,
{
    /// Apply `alg.map` to every element of `data`
    ///
    /// The output is a fresh collection from `alloc` with `out[i] ==
    /// alg.map(&data[i], args)`, whatever the launch geometry.
    fn parallel_map<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<Vec<Alg::Output>>;
}

/// In-place transform for shapes whose input and output types coincide
pub trait MapInPlaceOps<Alg, T, A>: BackendClient
where
    Alg: MutatingMap<T, A>,
{
    /// Apply `alg.map_in_place` to every element of `data`
    ///
    /// `data` is overwritten with the transformed values; nothing new is
    /// allocated on the host.
    fn parallel_map_in_place<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &mut [T],
        args: &A,
    ) -> Result<()>;
}
