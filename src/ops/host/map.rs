//! Host implementation of map operations.

use crate::algorithm::{Map, MutatingMap};
use crate::error::Result;
use crate::ops::{MapInPlaceOps, MapOps};
use crate::runtime::host::{HostClient, kernels};
use crate::runtime::{HostAllocator, LaunchConfig, allocate_output};

/// MapOps implementation for host runtime.
impl<Alg, T, A> MapOps<Alg, T, A> for HostClient
where
    Alg: Map<T, A> + Sync,
    Alg::Output: Send,
    T: Sync,
    A: Sync,
{
    fn parallel_map<M: HostAllocator>(
        &self,
        alg: &Alg,
        alloc: &M,
        cfg: &LaunchConfig,
        data: &[T],
        args: &A,
    ) -> Result<Vec<Alg::Output>> {
        let size = data.len();
        tracing::debug!(
            size,
            groups = cfg.group_count(),
            threads = cfg.threads_per_group(),
            "host map"
        );

        let mut out = allocate_output::<Alg::Output, M>(alloc, size)?;
        kernels::launch_indexed(
            &self.device,
            cfg,
            &mut out.spare_capacity_mut()[..size],
            |i, slot| {
                slot.write(alg.map(&data[i], args));
            },
        );
        // SAFETY: `launch_indexed` visits each of the first `size` slots
        // exactly once and has returned, so all of them are initialized.
        unsafe { out.set_len(size) };
        Ok(out)
    }
}

/// MapInPlaceOps implementation for host runtime.
impl<Alg, T, A> MapInPlaceOps<Alg, T, A> for HostClient
where
    Alg: MutatingMap<T, A> + Sync,
    T: Send,
    A: Sync,
{
    fn parallel_map_in_place<M: HostAllocator>(
        &self,
        alg: &Alg,
        _alloc: &M,
        cfg: &LaunchConfig,
        data: &mut [T],
        args: &A,
    ) -> Result<()> {
        tracing::debug!(
            size = data.len(),
            groups = cfg.group_count(),
            threads = cfg.threads_per_group(),
            "host map in place"
        );
        kernels::launch_indexed(&self.device, cfg, data, |_, item| {
            alg.map_in_place(item, args)
        });
        Ok(())
    }
}
