// ADB module - shared client handle for the Android Debug Bridge server
// The server is started through the `adb` executable when possible and
// reached directly through `adb_client` otherwise.

pub mod bootstrap;
pub mod config;
pub mod daemon;
pub mod error;
pub mod server;
pub mod types;


// Re-export the main types and functions for easy access
pub use bootstrap::{
    ClientSlot, DaemonBackend, ShellFirstBackend, client_handle_state, create_client,
    get_client_handle, get_client_handle_with, reset_client_handle,
};
pub use config::{AdbConfig, RetryPolicy};
pub use error::{AdbError, AdbResult};
pub use server::AdbHandle;
pub use types::{Device, SlotState};
