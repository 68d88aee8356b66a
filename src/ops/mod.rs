//! Parallel operations
//!
//! This module defines one operation trait per shape and the uniform entry
//! points callers use.
//!
//! # Design
//!
//! Operations are defined as traits implemented by each backend's client.
//! The client adds the element bounds its target needs, so a shape that a
//! backend cannot run for a given element type is a compile error, not a
//! runtime one.
//!
//! ```text
//! BackendClient
//!   ├── MapOps / MapInPlaceOps        (transform)
//!   ├── FilterOps                     (select + compact)
//!   ├── ReduceOps                     (combine)
//!   ├── MapReduceOps / MapInPlaceReduceOps
//!   └── MapFilterOps / MapInPlaceFilterOps
//! ```
//!
//! # Entry points
//!
//! Every function takes the client, the algorithm, the allocator for the
//! result, an optional [`LaunchConfig`] and the input collection, followed
//! by the extra arguments forwarded to each invocation. `None` means the
//! client's [`BackendClient::default_config`] for the input size.
//!
//! ```ignore
//! let client = DefaultBackend::default_client(&DefaultBackend::default_device())?;
//! let total = offload::ops::map_reduce(&client, &Scale, &DefaultAllocator, None, &data, &2.0)?;
//! ```
//!
//! [`run`] dispatches through the shape an algorithm declares with
//! [`Parallelizable`].

mod traits;

#[cfg(feature = "cpu")]
mod host;

#[cfg(feature = "cuda")]
mod cuda;

pub use traits::*;

use crate::algorithm::{Filter, Map, MutatingMap, Parallelizable, Reduce, Route, Shape};
use crate::error::Result;
use crate::runtime::{BackendClient, HostAllocator, LaunchConfig};

/// Use the caller's configuration or derive the client's default
#[inline]
fn resolve<C: BackendClient>(client: &C, cfg: Option<LaunchConfig>, size: usize) -> LaunchConfig {
    cfg.unwrap_or_else(|| client.default_config(size))
}

/// Apply `alg.map` to every element of `data` into a new collection
pub fn map<C, Alg, T, A, M>(
    client: &C,
    alg: &Alg,
    alloc: &M,
    cfg: Option<LaunchConfig>,
    data: &[T],
    args: &A,
) -> Result<Vec<Alg::Output>>
where
    Alg: Map<T, A>,
    C: MapOps<Alg, T, A>,
    M: HostAllocator,
{
    let cfg = resolve(client, cfg, data.len());
    client.parallel_map(alg, alloc, &cfg, data, args)
}

/// Apply `alg.map_in_place` to every element of `data`
///
/// Returns the mutated input.
pub fn map_in_place<'a, C, Alg, T, A, M>(
    client: &C,
    alg: &Alg,
    alloc: &M,
    cfg: Option<LaunchConfig>,
    data: &'a mut [T],
    args: &A,
) -> Result<&'a mut [T]>
where
    Alg: MutatingMap<T, A>,
    C: MapInPlaceOps<Alg, T, A>,
    M: HostAllocator,
{
    let cfg = resolve(client, cfg, data.len());
    client.parallel_map_in_place(alg, alloc, &cfg, &mut *data, args)?;
    Ok(data)
}

/// Keep the elements accepted by `alg.filter`, in unspecified order
pub fn filter<C, Alg, T, M>(
    client: &C,
    alg: &Alg,
    alloc: &M,
    cfg: Option<LaunchConfig>,
    data: &[T],
) -> Result<Vec<T>>
where
    Alg: Filter<T>,
    C: FilterOps<Alg, T>,
    M: HostAllocator,
{
    let cfg = resolve(client, cfg, data.len());
    client.parallel_filter(alg, alloc, &cfg, data)
}

/// Combine every element of `data` starting from `alg.identity()`
pub fn reduce<C, Alg, R, M>(
    client: &C,
    alg: &Alg,
    alloc: &M,
    cfg: Option<LaunchConfig>,
    data: &[R],
) -> Result<R>
where
    Alg: Reduce<R>,
    C: ReduceOps<Alg, R>,
    M: HostAllocator,
{
    let cfg = resolve(client, cfg, data.len());
    client.parallel_reduce(alg, alloc, &cfg, data)
}

/// Map every element, then combine the mapped values
pub fn map_reduce<C, Alg, T, A, M>(
    client: &C,
    alg: &Alg,
    alloc: &M,
    cfg: Option<LaunchConfig>,
    data: &[T],
    args: &A,
) -> Result<Alg::Output>
where
    Alg: Map<T, A> + Reduce<<Alg as Map<T, A>>::Output>,
    C: MapReduceOps<Alg, T, A>,
    M: HostAllocator,
{
    let cfg = resolve(client, cfg, data.len());
    client.parallel_map_reduce(alg, alloc, &cfg, data, args)
}

/// Map every element in place on a staged copy, then combine
///
/// `data` itself is not modified.
pub fn map_in_place_reduce<C, Alg, T, A, M>(
    client: &C,
    alg: &Alg,
    alloc: &M,
    cfg: Option<LaunchConfig>,
    data: &[T],
    args: &A,
) -> Result<T>
where
    Alg: MutatingMap<T, A> + Reduce<T>,
    C: MapInPlaceReduceOps<Alg, T, A>,
    M: HostAllocator,
{
    let cfg = resolve(client, cfg, data.len());
    client.parallel_map_in_place_reduce(alg, alloc, &cfg, data, args)
}

/// Map every element, then keep the mapped values `alg.filter` accepts
pub fn map_filter<C, Alg, T, A, M>(
    client: &C,
    alg: &Alg,
    alloc: &M,
    cfg: Option<LaunchConfig>,
    data: &[T],
    args: &A,
) -> Result<Vec<Alg::Output>>
where
    Alg: Map<T, A> + Filter<<Alg as Map<T, A>>::Output>,
    C: MapFilterOps<Alg, T, A>,
    M: HostAllocator,
{
    let cfg = resolve(client, cfg, data.len());
    client.parallel_map_filter(alg, alloc, &cfg, data, args)
}

/// Map every element in place on a staged copy, then keep the accepted ones
///
/// `data` itself is not modified.
pub fn map_in_place_filter<C, Alg, T, A, M>(
    client: &C,
    alg: &Alg,
    alloc: &M,
    cfg: Option<LaunchConfig>,
    data: &[T],
    args: &A,
) -> Result<Vec<T>>
where
    Alg: MutatingMap<T, A> + Filter<T>,
    C: MapInPlaceFilterOps<Alg, T, A>,
    M: HostAllocator,
{
    let cfg = resolve(client, cfg, data.len());
    client.parallel_map_in_place_filter(alg, alloc, &cfg, data, args)
}

/// Run `alg` as the shape it declares
///
/// `data` is borrowed mutably so the mutating-map shape can hand it back;
/// every other shape only reads it. Filter and reduce shapes ignore
/// `args`.
pub fn run<'a, C, Alg, T, A, M>(
    client: &C,
    alg: &Alg,
    alloc: &M,
    cfg: Option<LaunchConfig>,
    data: &'a mut [T],
    args: &A,
) -> Result<<Alg::Shape as Route<'a, C, Alg, T, A>>::Output>
where
    C: BackendClient,
    Alg: Parallelizable,
    Alg::Shape: Route<'a, C, Alg, T, A>,
    M: HostAllocator,
{
    let cfg = resolve(client, cfg, data.len());
    tracing::debug!(
        shape = <Alg::Shape as Shape>::NAME,
        size = data.len(),
        "run"
    );
    <Alg::Shape as Route<'a, C, Alg, T, A>>::route(client, alg, alloc, &cfg, data, args)
}
