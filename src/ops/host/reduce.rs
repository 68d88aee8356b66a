//! Host implementation of reduce operations.

use super::fold_indices;
use crate::algorithm::Reduce;
use crate::error::Result;
use crate::ops::ReduceOps;
use crate::runtime::host::HostClient;
use crate::runtime::{HostAllocator, LaunchConfig};

/// ReduceOps implementation for host runtime.
impl<Alg, R> ReduceOps<Alg, R> for HostClient
where
    Alg: Reduce<R> + Sync,
    R: Send + Sync,
{
    fn parallel_reduce<M: HostAllocator>(
        &self,
        alg: &Alg,
        _alloc: &M,
        cfg: &LaunchConfig,
        data: &[R],
    ) -> Result<R> {
        tracing::debug!(
            size = data.len(),
            groups = cfg.group_count(),
            threads = cfg.threads_per_group(),
            "host reduce"
        );
        Ok(fold_indices(self, alg, cfg, data.len(), |alg, acc, i| {
            alg.reduce(acc, &data[i])
        }))
    }
}
