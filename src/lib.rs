pub mod adb;
pub mod feedback;
pub mod log_watcher;
pub mod metrics;
pub mod timeout;

pub use adb::{AdbError, AdbHandle, AdbResult, get_client_handle};
