//! Launch geometry for parallel calls

use crate::error::{Error, Result};

/// Shape of a parallel launch: `group_count` groups (CUDA blocks, host
/// teams) of `threads_per_group` logical threads each
///
/// A configuration is plain input data. Drivers read it and never change
/// it. When a configuration has fewer threads than elements, each logical
/// thread walks several indices; when it has more, the surplus threads do
/// nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LaunchConfig {
    group_count: usize,
    threads_per_group: usize,
}

impl LaunchConfig {
    /// Create a configuration; both dimensions must be positive
    pub fn new(group_count: usize, threads_per_group: usize) -> Result<Self> {
        if group_count == 0 {
            return Err(Error::invalid_argument(
                "group_count",
                "launch needs at least one group",
            ));
        }
        if threads_per_group == 0 {
            return Err(Error::invalid_argument(
                "threads_per_group",
                "launch needs at least one thread per group",
            ));
        }
        Ok(Self {
            group_count,
            threads_per_group,
        })
    }

    /// One logical thread per element, grouped `group_width` at a time
    ///
    /// Every index in `0..size` maps to exactly one thread; only the last
    /// group can be partially filled. An empty input gets a `1 x 1` launch.
    pub fn for_size(size: usize, group_width: usize) -> Self {
        let threads_per_group = size.min(group_width).max(1);
        let group_count = size.div_ceil(threads_per_group).max(1);
        Self {
            group_count,
            threads_per_group,
        }
    }

    /// Number of groups
    #[inline]
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Threads in each group
    #[inline]
    pub fn threads_per_group(&self) -> usize {
        self.threads_per_group
    }

    /// Total logical threads launched
    #[inline]
    pub fn total_threads(&self) -> usize {
        self.group_count.saturating_mul(self.threads_per_group)
    }

    /// Whether one thread per element is available for `size` elements
    #[inline]
    pub fn covers(&self, size: usize) -> bool {
        self.total_threads() >= size
    }
}
