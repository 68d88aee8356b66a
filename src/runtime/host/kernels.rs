//! Host launch primitives
//!
//! All host drivers funnel through these functions. They map a
//! [`LaunchConfig`] onto nested rayon fan-outs and return only after every
//! worker has finished (the launch barrier).

use super::device::HostDevice;
use crate::runtime::LaunchConfig;
use rayon::prelude::*;
use std::ops::Range;

/// Length of each team's slice of `size` elements
#[inline]
fn team_len(cfg: &LaunchConfig, size: usize) -> usize {
    size.div_ceil(cfg.group_count())
}

/// Run `body` over disjoint index ranges that together cover `0..size`
///
/// Team `g` owns `g * team_len ..` and splits it again between its
/// threads. Ranges are never empty.
pub(crate) fn launch_ranges<F>(device: &HostDevice, cfg: &LaunchConfig, size: usize, body: F)
where
    F: Fn(Range<usize>) + Sync,
{
    if size == 0 {
        return;
    }
    let team_len = team_len(cfg, size);
    let teams = size.div_ceil(team_len);
    let threads = cfg.threads_per_group();

    device.install(|| {
        (0..teams).into_par_iter().for_each(|team| {
            let team_start = team * team_len;
            let team_end = (team_start + team_len).min(size);
            let thread_len = (team_end - team_start).div_ceil(threads);
            (0..threads).into_par_iter().for_each(|thread| {
                let start = team_start + thread * thread_len;
                let end = (start + thread_len).min(team_end);
                if start < end {
                    body(start..end);
                }
            });
        });
    });
}

/// Fold every index of `0..size` into one partial per team
///
/// Same geometry as [`launch_ranges`]. Inside a team rayon folds the
/// thread ranges, so `identity` and `merge` run once per rayon split, not
/// once per index. Each team hands its merged partial to `combine` exactly
/// once; teams call `combine` concurrently.
pub(crate) fn launch_fold<R, I, F, G, C>(
    device: &HostDevice,
    cfg: &LaunchConfig,
    size: usize,
    identity: I,
    fold: F,
    merge: G,
    combine: C,
) where
    R: Send,
    I: Fn() -> R + Sync,
    F: Fn(&mut R, usize) + Sync,
    G: Fn(&mut R, &R) + Sync,
    C: Fn(R) + Sync,
{
    if size == 0 {
        return;
    }
    let team_len = team_len(cfg, size);
    let teams = size.div_ceil(team_len);
    let threads = cfg.threads_per_group();

    device.install(|| {
        (0..teams).into_par_iter().for_each(|team| {
            let team_start = team * team_len;
            let team_end = (team_start + team_len).min(size);
            let thread_len = (team_end - team_start).div_ceil(threads);
            let partial = (0..threads)
                .into_par_iter()
                .fold(&identity, |mut acc, thread| {
                    let start = team_start + thread * thread_len;
                    let end = (start + thread_len).min(team_end);
                    for i in start..end {
                        fold(&mut acc, i);
                    }
                    acc
                })
                .reduce_with(|mut acc, partial| {
                    merge(&mut acc, &partial);
                    acc
                });
            if let Some(partial) = partial {
                combine(partial);
            }
        });
    });
}

/// Run `body(i, &mut out[i])` for every slot of `out`
///
/// Same geometry as [`launch_ranges`], but each worker receives the
/// mutable slice of the output it owns, so no synchronization is needed.
pub(crate) fn launch_indexed<O, F>(device: &HostDevice, cfg: &LaunchConfig, out: &mut [O], body: F)
where
    O: Send,
    F: Fn(usize, &mut O) + Sync,
{
    let size = out.len();
    if size == 0 {
        return;
    }
    let team_len = team_len(cfg, size);
    let threads = cfg.threads_per_group();

    device.install(|| {
        out.par_chunks_mut(team_len)
            .enumerate()
            .for_each(|(team, team_slice)| {
                let team_start = team * team_len;
                let thread_len = team_slice.len().div_ceil(threads);
                team_slice
                    .par_chunks_mut(thread_len)
                    .enumerate()
                    .for_each(|(thread, chunk)| {
                        let start = team_start + thread * thread_len;
                        for (offset, slot) in chunk.iter_mut().enumerate() {
                            body(start + offset, slot);
                        }
                    });
            });
    });
}
