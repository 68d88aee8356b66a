//! Filter operation trait.

use crate::algorithm::Filter;
use crate::error::Result;
use crate::runtime::{BackendClient, HostAllocator, LaunchConfig};

/// Predicate-based selection with lock-free compaction
pub trait FilterOps<Alg, T>: BackendClient
where
    Alg: Filter<T>,
{
    /// Keep the elements of `data` accepted by `alg.filter`
    ///
    /// The result holds exactly the accepted elements, packed without gaps,
    /// in unspecified order. Nothing accepted yields an empty vector.
    fn parallel_filter<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
    ) -> Result<Vec<T>>;
}
