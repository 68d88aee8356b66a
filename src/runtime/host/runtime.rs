//! Host runtime implementation

use super::client::HostClient;
use super::device::HostDevice;
use crate::error::Result;
use crate::runtime::Backend;

/// Multi-core host backend
///
/// This is the default backend that works on any platform.
#[derive(Clone, Debug, Default)]
pub struct HostBackend;

impl Backend for HostBackend {
    type Device = HostDevice;
    type Client = HostClient;

    fn name() -> &'static str {
        "host"
    }

    fn default_device() -> Self::Device {
        HostDevice::new()
    }

    fn default_client(device: &Self::Device) -> Result<Self::Client> {
        Ok(HostClient::new(device.clone()))
    }
}
