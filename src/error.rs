//! Error types for adb-shellfs.

use thiserror::Error;

use crate::protocol::ErrorKind;

/// Main error type for adb-shellfs operations.
#[derive(Error, Debug)]
pub enum AdbShellError {
    /// The adb executable could not be located.
    #[error("adb executable not found")]
    AdbNotFound,

    /// Spawning the child process failed.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The shell process exited right after being started.
    #[error("shell terminated immediately ({0})")]
    ExitedAtStart(String),

    /// The session is not running.
    #[error("session not running: current state is {0:?}")]
    NotRunning(crate::session::SessionState),

    /// The shell closed its output before the marker arrived.
    #[error("unexpected EOF from shell")]
    UnexpectedEof,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Command execution timeout.
    #[error("command execution timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// The device facade is not connected.
    #[error("device not connected")]
    NotConnected,

    /// The shell answered `pwd` with nothing.
    #[error("shell reported an empty working directory")]
    EmptyWorkingDirectory,

    /// Invalid connection state transition attempted.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: crate::device::ConnectionState,
        to: crate::device::ConnectionState,
    },

    /// Composite listing output did not have the expected shape.
    #[error("malformed listing response: {0}")]
    MalformedListing(String),

    /// A device-side command reported a failure.
    #[error("{kind}: {message}")]
    Command { kind: ErrorKind, message: String },
}

impl AdbShellError {
    /// Classify this error into the normalized failure set.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Command { kind, .. } => *kind,
            Self::AdbNotFound => ErrorKind::DeviceNotFound,
            Self::UnexpectedEof => ErrorKind::BrokenPipe,
            Self::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe => ErrorKind::BrokenPipe,
            _ => ErrorKind::GenericIO,
        }
    }
}

/// Convenience Result type for adb-shellfs operations.
pub type Result<T> = std::result::Result<T, AdbShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_running_display() {
        let err = AdbShellError::NotRunning(crate::session::SessionState::Stopped);
        assert!(err.to_string().contains("not running"));
        assert!(err.to_string().contains("Stopped"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AdbShellError = io_err.into();
        assert!(matches!(err, AdbShellError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
        assert_eq!(err.kind(), ErrorKind::GenericIO);
    }

    #[test]
    fn test_broken_pipe_kind() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        assert_eq!(AdbShellError::from(io_err).kind(), ErrorKind::BrokenPipe);
        assert_eq!(AdbShellError::UnexpectedEof.kind(), ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_command_error_display() {
        let err = AdbShellError::Command {
            kind: ErrorKind::ReadOnlyFilesystem,
            message: "mkdir failed: Read-only file system".into(),
        };
        assert_eq!(err.kind(), ErrorKind::ReadOnlyFilesystem);
        assert!(err.to_string().contains("mkdir failed"));
    }

    #[test]
    fn test_empty_working_directory_is_generic() {
        let err = AdbShellError::EmptyWorkingDirectory;
        assert!(err.to_string().contains("working directory"));
        assert_eq!(err.kind(), ErrorKind::GenericIO);
    }

    #[test]
    fn test_timeout_display() {
        let err = AdbShellError::Timeout(std::time::Duration::from_secs(3));
        assert!(err.to_string().contains("timeout"));
        assert!(err.to_string().contains("3s"));
    }
}
