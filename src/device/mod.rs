//! Device-level operations on top of the shell session.
//!
//! - locating the `adb` executable
//! - one-shot adb invocations (transfers, queries)
//! - attached device discovery
//! - the per-device facade with its connection state machine

mod devices;
mod facade;
mod locator;
mod oneshot;
mod state;

pub use devices::{list_devices, parse_devices_output, parse_friendly_name, DeviceInfo};
pub use facade::{AdbDevice, DeviceOptions};
pub use locator::{looks_like_adb_version, AdbLocator, ADB_CANDIDATES};
pub use oneshot::{AdbCommand, AdbOutput, DEFAULT_ONESHOT_TIMEOUT};
pub use state::ConnectionState;
