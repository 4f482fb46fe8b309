//! # adb-shellfs
//!
//! Filesystem access to Android devices over a persistent `adb shell`.
//!
//! The crate turns the unframed byte stream of an interactive shell into a
//! request/response channel and layers a directory protocol on top of it:
//! one composite command lists a directory, resolves its real path and
//! classifies every symlink in a single round trip.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use adb_shellfs::{AdbDevice, AdbLocator, DeviceOptions};
//!
//! #[tokio::main]
//! async fn main() -> adb_shellfs::Result<()> {
//!     adb_shellfs::logging::try_init().ok();
//!
//!     let locator = Arc::new(AdbLocator::new());
//!     let mut device = AdbDevice::new(locator, DeviceOptions::default());
//!     device.connect().await?;
//!
//!     let listing = device.list_directory("/sdcard").await?;
//!     for entry in &listing.entries {
//!         println!("{:?} {}", entry.kind, entry.name);
//!     }
//!
//!     device.disconnect();
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod output;
pub mod protocol;
pub mod session;

// Re-export commonly used types
pub use device::{AdbDevice, AdbLocator, ConnectionState, DeviceInfo, DeviceOptions};
pub use error::{AdbShellError, Result};
pub use output::OutputSanitizer;
pub use protocol::{DirectoryEntry, EntryKind, ErrorKind, ListingResponse};
pub use session::{SessionState, ShellLauncher, ShellSession};
