//! Reduce operation trait.

use crate::algorithm::Reduce;
use crate::error::Result;
use crate::runtime::{BackendClient, HostAllocator, LaunchConfig};

/// Commutative/associative combine over a collection
pub trait ReduceOps<Alg, R>: BackendClient
where
    Alg: Reduce<R>,
{
    /// Fold every element of `data` into `alg.identity()`
    ///
    /// Each element contributes exactly once. An empty input returns the
    /// identity.
    fn parallel_reduce<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[R],
    ) -> Result<R>;
}
