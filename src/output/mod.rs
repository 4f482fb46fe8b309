//! Output processing for raw shell text.
//!
//! Shell output arrives as unframed bytes. Before it is parsed it is
//! decoded leniently and stripped of terminal control sequences, which
//! some `ls` builds emit when `TERM` is set.
//!
//! # Example
//!
//! ```
//! use adb_shellfs::output::OutputSanitizer;
//!
//! let raw = b"\x1b[1;34mDownload\x1b[0m\r\n";
//! let clean = OutputSanitizer::strip_ansi(raw);
//! assert_eq!(OutputSanitizer::trim_line_endings(&clean), "Download");
//! ```

mod sanitizer;

pub use sanitizer::OutputSanitizer;
