//! Shape composer: routes an algorithm to exactly one parallel primitive
//!
//! An algorithm states which operation shape it runs as by implementing
//! [`Parallelizable`]. The associated [`Parallelizable::Shape`] names one
//! marker type, and each marker implements [`Route`] only when the
//! algorithm has the capabilities that shape needs and the client can
//! execute it. Routing is therefore decided entirely at compile time:
//!
//! | marker                    | capabilities            | result       |
//! |---------------------------|-------------------------|--------------|
//! | [`MapShape`]              | `Map`                   | `Vec<Output>`|
//! | [`MutatingMapShape`]      | `MutatingMap`           | `&mut [T]`   |
//! | [`FilterShape`]           | `Filter`                | `Vec<T>`     |
//! | [`ReduceShape`]           | `Reduce`                | `T`          |
//! | [`MapReduceShape`]        | `Map + Reduce`          | `Output`     |
//! | [`MutatingMapReduceShape`]| `MutatingMap + Reduce`  | `T`          |
//! | [`MapFilterShape`]        | `Map + Filter`          | `Vec<Output>`|
//! | [`MutatingMapFilterShape`]| `MutatingMap + Filter`  | `Vec<T>`     |
//!
//! An associated type has exactly one value, so an algorithm that
//! implements, say, both `Map + Reduce` and `Map + Filter` is never
//! resolved by priority: it runs as whatever shape it declares. Declaring
//! a shape without its capabilities, or calling [`run`](crate::ops::run)
//! with an algorithm that declares none, does not compile:
//!
//! ```compile_fail
//! use offload::prelude::*;
//!
//! struct Keep;
//!
//! impl Filter<u32> for Keep {
//!     fn filter(&self, _: &u32) -> bool {
//!         true
//!     }
//! }
//!
//! // `Keep` has no `Reduce` capability
//! impl Parallelizable for Keep {
//!     type Shape = ReduceShape;
//! }
//!
//! let client = HostBackend::default_client(&HostBackend::default_device()).unwrap();
//! let mut data = vec![1u32, 2, 3];
//! let _ = offload::ops::run(&client, &Keep, &DefaultAllocator, None, &mut data, &());
//! ```

use super::capability::{Filter, Map, MutatingMap, Reduce};
use crate::error::Result;
use crate::ops::{
    FilterOps, MapFilterOps, MapInPlaceFilterOps, MapInPlaceOps, MapInPlaceReduceOps, MapOps,
    MapReduceOps, ReduceOps,
};
use crate::runtime::{HostAllocator, LaunchConfig};

/// Operation shape marker
pub trait Shape {
    /// Name used in log events
    const NAME: &'static str;
}

macro_rules! shape_markers {
    ($($(#[$doc:meta])* $name:ident => $label:literal),* $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
            pub struct $name;

            impl Shape for $name {
                const NAME: &'static str = $label;
            }
        )*
    };
}

shape_markers! {
    /// Element-to-new-element transform
    MapShape => "map",
    /// In-place transform of the caller's collection
    MutatingMapShape => "map_in_place",
    /// Predicate-based selection
    FilterShape => "filter",
    /// Combine of every element
    ReduceShape => "reduce",
    /// Transform then combine
    MapReduceShape => "map_reduce",
    /// In-place transform then combine
    MutatingMapReduceShape => "map_in_place_reduce",
    /// Transform then select
    MapFilterShape => "map_filter",
    /// In-place transform then select
    MutatingMapFilterShape => "map_in_place_filter",
}

/// Algorithm that declares the shape [`run`](crate::ops::run) executes it as
pub trait Parallelizable {
    /// The one shape this algorithm runs as
    type Shape: Shape;
}

/// Dispatch from a shape marker to the client's primitive
///
/// Implemented by the shape markers; bounded by the capabilities of the
/// shape and by the operation trait the client must provide for it.
pub trait Route<'a, C, Alg, T: 'a, A> {
    /// What the call hands back to the caller
    type Output;

    /// Execute `alg` over `data` on `client`
    fn route<M: HostAllocator>(
        client: &C,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &'a mut [T],
        args: &A,
    ) -> Result<Self::Output>;
}

impl<'a, C, Alg, T: 'a, A> Route<'a, C, Alg, T, A> for MapShape
where
    Alg: Map<T, A>,
    C: MapOps<Alg, T, A>,
{
    type Output = Vec<Alg::Output>;

    fn route<M: HostAllocator>(
        client: &C,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &'a mut [T],
        args: &A,
    ) -> Result<Self::Output> {
        client.parallel_map(alg, alloc, cfg, data, args)
    }
}

impl<'a, C, Alg, T: 'a, A> Route<'a, C, Alg, T, A> for MutatingMapShape
where
    Alg: MutatingMap<T, A>,
    C: MapInPlaceOps<Alg, T, A>,
{
    type Output = &'a mut [T];

    fn route<M: HostAllocator>(
        client: &C,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &'a mut [T],
        args: &A,
    ) -> Result<Self::Output> {
        client.parallel_map_in_place(alg, alloc, cfg, &mut *data, args)?;
        Ok(data)
    }
}

impl<'a, C, Alg, T: 'a, A> Route<'a, C, Alg, T, A> for FilterShape
where
    Alg: Filter<T>,
    C: FilterOps<Alg, T>,
{
    type Output = Vec<T>;

    /// Filter takes no extra arguments; `args` is ignored.
    fn route<M: HostAllocator>(
        client: &C,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &'a mut [T],
        _args: &A,
    ) -> Result<Self::Output> {
        client.parallel_filter(alg, alloc, cfg, data)
    }
}

impl<'a, C, Alg, T: 'a, A> Route<'a, C, Alg, T, A> for ReduceShape
where
    Alg: Reduce<T>,
    C: ReduceOps<Alg, T>,
{
    type Output = T;

    /// Reduce takes no extra arguments; `args` is ignored.
    fn route<M: HostAllocator>(
        client: &C,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &'a mut [T],
        _args: &A,
    ) -> Result<Self::Output> {
        client.parallel_reduce(alg, alloc, cfg, data)
    }
}

impl<'a, C, Alg, T: 'a, A> Route<'a, C, Alg, T, A> for MapReduceShape
where
    Alg: Map<T, A> + Reduce<<Alg as Map<T, A>>::Output>,
    C: MapReduceOps<Alg, T, A>,
{
    type Output = <Alg as Map<T, A>>::Output;

    fn route<M: HostAllocator>(
        client: &C,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &'a mut [T],
        args: &A,
    ) -> Result<Self::Output> {
        client.parallel_map_reduce(alg, alloc, cfg, data, args)
    }
}

impl<'a, C, Alg, T: 'a, A> Route<'a, C, Alg, T, A> for MutatingMapReduceShape
where
    Alg: MutatingMap<T, A> + Reduce<T>,
    C: MapInPlaceReduceOps<Alg, T, A>,
{
    type Output = T;

    fn route<M: HostAllocator>(
        client: &C,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &'a mut [T],
        args: &A,
    ) -> Result<Self::Output> {
        client.parallel_map_in_place_reduce(alg, alloc, cfg, data, args)
    }
}

impl<'a, C, Alg, T: 'a, A> Route<'a, C, Alg, T, A> for MapFilterShape
where
    Alg: Map<T, A> + Filter<<Alg as Map<T, A>>::Output>,
    C: MapFilterOps<Alg, T, A>,
{
    type Output = Vec<<Alg as Map<T, A>>::Output>;

    fn route<M: HostAllocator>(
        client: &C,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &'a mut [T],
        args: &A,
    ) -> Result<Self::Output> {
        client.parallel_map_filter(alg, alloc, cfg, data, args)
    }
}

impl<'a, C, Alg, T: 'a, A> Route<'a, C, Alg, T, A> for MutatingMapFilterShape
where
    Alg: MutatingMap<T, A> + Filter<T>,
    C: MapInPlaceFilterOps<Alg, T, A>,
{
    type Output = Vec<T>;

    fn route<M: HostAllocator>(
        client: &C,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &'a mut [T],
        args: &A,
    ) -> Result<Self::Output> {
        client.parallel_map_in_place_filter(alg, alloc, cfg, data, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name<S: Shape>() -> &'static str {
        S::NAME
    }

    #[test]
    fn test_marker_names_are_distinct() {
        let mut names = vec![
            name::<MapShape>(),
            name::<MutatingMapShape>(),
            name::<FilterShape>(),
            name::<ReduceShape>(),
            name::<MapReduceShape>(),
            name::<MutatingMapReduceShape>(),
            name::<MapFilterShape>(),
            name::<MutatingMapFilterShape>(),
        ];
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 8);
    }
}
