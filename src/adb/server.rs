// https://crates.io/crates/adb_client
use super::error::{AdbError, AdbResult};
use super::types::Device;
use crate::timeout::with_timeout;
use adb_client::ADBServer;
use std::net::SocketAddrV4;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Live connection to the ADB server.
///
/// `adb_client` is blocking and needs `&mut` access, so every request runs on
/// the blocking pool with the server behind a mutex.
pub struct AdbHandle {
    address: SocketAddrV4,
    request_timeout: Duration,
    server: Arc<Mutex<ADBServer>>,
}

impl std::fmt::Debug for AdbHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdbHandle")
            .field("address", &self.address)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl AdbHandle {
    /// Creates a handle without contacting the server.
    pub fn new(address: SocketAddrV4, request_timeout: Duration) -> Self {
        Self {
            address,
            request_timeout,
            server: Arc::new(Mutex::new(ADBServer::new(address))),
        }
    }

    pub fn address(&self) -> SocketAddrV4 {
        self.address
    }

    /// Lists attached devices. Doubles as the liveness probe.
    pub async fn list_devices(&self) -> AdbResult<Vec<Device>> {
        let server = self.server.clone();
        let request = tokio::task::spawn_blocking(move || {
            let mut server = server.lock().map_err(|_| AdbError::LockPoisoned)?;
            server
                .devices()
                .map_err(|e| AdbError::server("devices", e))
        });
        let devices = with_timeout(
            self.request_timeout,
            request,
            format!("listing devices on {}", self.address),
        )
        .await???;
        Ok(devices.into_iter().map(Device::from).collect())
    }
}
