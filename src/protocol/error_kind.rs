//! Classification of free-text command failures.

use std::fmt;

use serde::Serialize;

/// Normalized failure categories for device-side operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    AccessDenied,
    NoSpace,
    ReadOnlyFilesystem,
    BrokenPipe,
    OperationNotPermitted,
    DirectoryNotEmpty,
    DeviceNotFound,
    InvalidArgument,
    GenericIO,
}

/// Phrase table, most specific first. First match wins.
const PHRASES: &[(&str, ErrorKind)] = &[
    ("remote object", ErrorKind::NotFound),
    ("does not exist", ErrorKind::NotFound),
    ("no such file or directory", ErrorKind::NotFound),
    ("file exists", ErrorKind::AlreadyExists),
    ("permission denied", ErrorKind::AccessDenied),
    ("insufficient permissions for device", ErrorKind::AccessDenied),
    ("no space left on device", ErrorKind::NoSpace),
    ("read-only file system", ErrorKind::ReadOnlyFilesystem),
    ("broken pipe", ErrorKind::BrokenPipe),
    ("error: closed", ErrorKind::BrokenPipe),
    ("operation not permitted", ErrorKind::OperationNotPermitted),
    ("directory not empty", ErrorKind::DirectoryNotEmpty),
    ("device not found", ErrorKind::DeviceNotFound),
    ("no devices/emulators found", ErrorKind::DeviceNotFound),
    ("more than one device/emulator", ErrorKind::InvalidArgument),
];

impl ErrorKind {
    /// Map command output text to a failure category.
    ///
    /// Matching is ASCII case-insensitive; text matching no known phrase
    /// (including empty text) is [`ErrorKind::GenericIO`].
    pub fn from_text(text: &str) -> Self {
        let lowered = text.to_ascii_lowercase();
        PHRASES
            .iter()
            .find(|(phrase, _)| lowered.contains(phrase))
            .map(|(_, kind)| *kind)
            .unwrap_or(ErrorKind::GenericIO)
    }

    /// POSIX errno equivalent.
    pub fn errno(&self) -> i32 {
        match self {
            Self::NotFound => libc::ENOENT,
            Self::AlreadyExists => libc::EEXIST,
            Self::AccessDenied => libc::EACCES,
            Self::NoSpace => libc::ENOSPC,
            Self::ReadOnlyFilesystem => libc::EROFS,
            Self::BrokenPipe => libc::EPIPE,
            Self::OperationNotPermitted => libc::EPERM,
            Self::DirectoryNotEmpty => libc::ENOTEMPTY,
            Self::DeviceNotFound => libc::ENODEV,
            Self::InvalidArgument => libc::EINVAL,
            Self::GenericIO => libc::EIO,
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::AlreadyExists => "already exists",
            Self::AccessDenied => "access denied",
            Self::NoSpace => "no space left",
            Self::ReadOnlyFilesystem => "read-only filesystem",
            Self::BrokenPipe => "broken pipe",
            Self::OperationNotPermitted => "operation not permitted",
            Self::DirectoryNotEmpty => "directory not empty",
            Self::DeviceNotFound => "no such device",
            Self::InvalidArgument => "invalid argument",
            Self::GenericIO => "I/O error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
