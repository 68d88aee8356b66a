//! Global client cache for CUDA runtime

use super::client::CudaClient;
use super::device::CudaDevice;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

/// Global client cache: device index -> cached CudaClient
///
/// Creating a context and a stream is expensive, so each device gets one
/// client that every caller shares.
static CLIENT_CACHE: OnceLock<Mutex<HashMap<usize, CudaClient>>> = OnceLock::new();

/// Lock a cache, recovering from a poisoned mutex.
///
/// Cache operations are idempotent inserts, so a panic while holding the
/// lock cannot leave a half-written entry.
#[inline]
pub(super) fn lock_cache<K, V>(cache: &Mutex<HashMap<K, V>>) -> MutexGuard<'_, HashMap<K, V>> {
    cache.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("recovering poisoned CUDA cache lock");
        PoisonError::into_inner(poisoned)
    })
}

/// Get or create the cached CudaClient for a device.
pub(super) fn get_or_create_client(device: &CudaDevice) -> Result<CudaClient> {
    let cache = CLIENT_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = lock_cache(cache);

    if let Some(client) = guard.get(&device.index) {
        return Ok(client.clone());
    }

    let client = CudaClient::new(device.clone())?;
    guard.insert(device.index, client.clone());
    Ok(client)
}
