//! Persistent remote-shell session.
//!
//! This module turns a child process that only offers an unframed byte
//! stream into a sequential command/response channel:
//! - marker generation for end-of-output detection
//! - session lifecycle state
//! - a pump bridging the blocking output pipe into async code
//!
//! # Example
//!
//! ```no_run
//! use adb_shellfs::session::{ShellLauncher, ShellSession};
//!
//! # async fn demo() -> adb_shellfs::Result<()> {
//! let mut session = ShellSession::new(ShellLauncher::adb_shell("adb", None));
//! session.start().await?;
//! let cwd = session.execute("pwd").await?;
//! println!("remote cwd: {cwd}");
//! session.stop();
//! # Ok(())
//! # }
//! ```

mod marker;
mod reader;
mod shell;
mod state;

pub use marker::MarkerGenerator;
pub use reader::{Chunk, OutputPump};
pub use shell::{ShellLauncher, ShellSession, DEFAULT_COMMAND_TIMEOUT};
pub use state::SessionState;
