//! Trait for backend clients that launch work on a device

use super::Backend;
use crate::error::Result;
use crate::runtime::LaunchConfig;

/// Trait for backend clients that launch work on a device
///
/// A client is cheap to clone. The per-shape operation traits in
/// [`crate::ops`] are implemented on client types, each with the element
/// bounds its backend needs.
pub trait BackendClient: Clone + Send + Sync {
    /// Backend this client belongs to
    type Backend: Backend<Client = Self>;

    /// Get the device this client operates on
    fn device(&self) -> &<Self::Backend as Backend>::Device;

    /// Synchronize: wait for all pending work to complete
    fn synchronize(&self) -> Result<()>;

    /// Launch geometry used when a call does not supply one
    ///
    /// Must cover every index in `0..size` exactly once.
    fn default_config(&self, size: usize) -> LaunchConfig;
}
