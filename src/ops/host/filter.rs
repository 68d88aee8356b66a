//! Host implementation of filter operations.

use super::compact_indices;
use crate::algorithm::Filter;
use crate::error::Result;
use crate::ops::FilterOps;
use crate::runtime::host::HostClient;
use crate::runtime::{HostAllocator, LaunchConfig};

/// FilterOps implementation for host runtime.
impl<Alg, T> FilterOps<Alg, T> for HostClient
where
    Alg: Filter<T> + Sync,
    T: Clone + Send + Sync,
{
    fn parallel_filter<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
    ) -> Result<Vec<T>> {
        let out = compact_indices(self, alloc, cfg, data.len(), |i| {
            let item = &data[i];
            alg.filter(item).then(|| item.clone())
        })?;
        tracing::debug!(size = data.len(), accepted = out.len(), "host filter");
        Ok(out)
    }
}
