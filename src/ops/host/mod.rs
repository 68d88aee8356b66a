//! Host implementation of the parallel shapes.
//!
//! This module contains the operation trait implementations for the host
//! runtime. Each shape family has its own module; the fold and compaction
//! drivers below are shared by plain and fused shapes.
//!
//! Fused shapes are fully fused here: workers map an element and feed it
//! straight into the reduce or filter stage, so no intermediate collection
//! is ever materialized.

mod filter;
mod fused;
mod map;
mod reduce;

use crate::algorithm::Reduce;
use crate::error::Result;
use crate::runtime::host::{HostClient, kernels};
use crate::runtime::{CompactionBuffer, HostAllocator, LaunchConfig, allocate_output};
use parking_lot::Mutex;

/// Fold `size` logical elements into one value
///
/// Each team folds its range into a private partial starting from the
/// identity, then combines the partial into the shared accumulator under a
/// lock. The lock is taken once per team and every element lands exactly
/// once.
pub(crate) fn fold_indices<Alg, R, F>(
    client: &HostClient,
    alg: &Alg,
    cfg: &LaunchConfig,
    size: usize,
    fold: F,
) -> R
where
    Alg: Reduce<R> + Sync,
    R: Send,
    F: Fn(&Alg, &mut R, usize) + Sync,
{
    let acc = Mutex::new(alg.identity());
    kernels::launch_fold(
        &client.device,
        cfg,
        size,
        || alg.identity(),
        |partial, i| fold(alg, partial, i),
        |partial, other| alg.reduce(partial, other),
        |partial| alg.reduce(&mut acc.lock(), &partial),
    );
    acc.into_inner()
}

/// Pack the values `select` returns for `size` logical elements
///
/// The output holds at most `size` elements and is allocated up front from
/// `alloc`; accepted values are placed through the shared slot counter.
pub(crate) fn compact_indices<O, M, F>(
    client: &HostClient,
    alloc: &M,
    cfg: &LaunchConfig,
    size: usize,
    select: F,
) -> Result<Vec<O>>
where
    O: Send,
    M: HostAllocator,
    F: Fn(usize) -> Option<O> + Sync,
{
    let mut buffer = CompactionBuffer::new(allocate_output::<O, M>(alloc, size)?);
    {
        let writer = buffer.writer();
        kernels::launch_ranges(&client.device, cfg, size, |range| {
            for i in range {
                if let Some(value) = select(i) {
                    writer.push(value);
                }
            }
        });
    }
    Ok(buffer.finish())
}
