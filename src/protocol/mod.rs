//! Directory enumeration protocol.
//!
//! A listing request becomes a single composite shell command (`cd`,
//! `pwd`, `ls -la`, symlink classification) and its combined output is
//! parsed back into typed entries. Free-text failures from other commands
//! are normalized through [`ErrorKind::from_text`].
//!
//! # Example
//!
//! ```
//! use adb_shellfs::protocol::{build_listing_command, parse_listing_response, EntryKind};
//!
//! let cmd = build_listing_command("/sdcard");
//! assert!(cmd.starts_with("cd \"/sdcard\""));
//!
//! let raw = "/sdcard\ntotal 4\ndrwxr-xr-x 2 root root 4096 2024-01-15 09:30 Music\n<<<SEP>>>\n";
//! let listing = parse_listing_response(raw).unwrap();
//! assert_eq!(listing.path, "/sdcard");
//! assert_eq!(listing.entries[0].kind, EntryKind::Directory);
//! ```

mod command;
mod datetime;
mod entry;
mod error_kind;
mod parser;

pub use command::{build_cd_command, build_listing_command, quote_path, ARROW, SEPARATOR};
pub use datetime::{month_number, parse_ls_datetime, parse_ls_datetime_at};
pub use entry::{DirectoryEntry, EntryKind, ListingResponse};
pub use error_kind::ErrorKind;
pub use parser::{apply_symlink_types, parse_listing_response, parse_ls_line, parse_symlink_record};
