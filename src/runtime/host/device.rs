//! Host device implementation

use crate::error::{Error, Result};
use crate::runtime::Device;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

/// Host device: a pool of worker threads on the local CPU
///
/// The default device runs on rayon's global pool. [`HostDevice::with_threads`]
/// gives a device its own pool.
#[derive(Clone, Debug, Default)]
pub struct HostDevice {
    id: usize,
    pool: Option<Arc<ThreadPool>>,
}

impl HostDevice {
    /// Device backed by rayon's global pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a device with exactly `threads` workers
    pub fn with_threads(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(Error::invalid_argument(
                "threads",
                "host device needs at least one worker",
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("offload-host-{i}"))
            .build()
            .map_err(|e| Error::Backend(format!("failed to start host worker pool: {e}")))?;
        tracing::debug!(threads = pool.current_num_threads(), "host device ready");
        Ok(Self {
            id: 0,
            pool: Some(Arc::new(pool)),
        })
    }

    /// Number of worker threads
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Run `op` inside this device's worker pool
    pub(crate) fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl Device for HostDevice {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> String {
        "host".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_threads_sets_pool_size() {
        let device = HostDevice::with_threads(3).unwrap();
        assert_eq!(device.num_threads(), 3);
        assert_eq!(device.name(), "host");
    }

    #[test]
    fn test_default_device_uses_global_pool() {
        let device = HostDevice::new();
        assert_eq!(device.num_threads(), rayon::current_num_threads());
        assert!(device.is_same(&HostDevice::default()));
        assert_eq!(device.install(|| 41 + 1), 42);
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(
            HostDevice::with_threads(0),
            Err(Error::InvalidArgument { arg: "threads", .. })
        ));
    }

    #[test]
    fn test_install_runs_on_pool() {
        let device = HostDevice::with_threads(2).unwrap();
        let name = device.install(|| std::thread::current().name().map(str::to_owned));
        assert!(name.unwrap().starts_with("offload-host-"));
    }
}
