//! Host client implementation

use super::device::HostDevice;
use super::kernels;
use super::runtime::HostBackend;
use crate::error::Result;
use crate::runtime::{BackendClient, LaunchConfig};

/// Host client for launching work on a [`HostDevice`]
#[derive(Clone, Debug)]
pub struct HostClient {
    pub(crate) device: HostDevice,
}

impl HostClient {
    /// Create a new host client
    pub fn new(device: HostDevice) -> Self {
        Self { device }
    }

    /// Launch `body` once for every index in `0..size`
    ///
    /// Raw index launcher for work that does not fit a capability shape.
    /// Invocations run concurrently in no particular order; `body` must only
    /// touch state it owns or synchronizes itself.
    pub fn parallel_for<F>(&self, cfg: &LaunchConfig, size: usize, body: F)
    where
        F: Fn(usize) + Sync,
    {
        tracing::debug!(
            size,
            groups = cfg.group_count(),
            threads = cfg.threads_per_group(),
            "host parallel_for"
        );
        kernels::launch_ranges(&self.device, cfg, size, |range| range.for_each(&body));
    }
}

impl BackendClient for HostClient {
    type Backend = HostBackend;

    fn device(&self) -> &HostDevice {
        &self.device
    }

    fn synchronize(&self) -> Result<()> {
        // Every host launch blocks until its workers are done
        Ok(())
    }

    /// One team per worker thread, each element its own logical thread.
    fn default_config(&self, size: usize) -> LaunchConfig {
        let workers = self.device.num_threads().max(1);
        LaunchConfig::for_size(size, size.div_ceil(workers))
    }
}
