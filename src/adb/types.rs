// Core ADB types
use serde::Serialize;

/// A device attached to the ADB server, as reported by `devices`.
#[derive(Debug, PartialEq, Eq, Serialize, Clone)]
pub struct Device {
    pub name: String,
    pub state: String,
}

impl From<adb_client::DeviceShort> for Device {
    fn from(device: adb_client::DeviceShort) -> Self {
        Device {
            name: device.identifier,
            state: device.state.to_string(),
        }
    }
}

/// Observable lifecycle of the shared client slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotState {
    Uninitialized,
    InProgress,
    Ready,
    Failed,
}
