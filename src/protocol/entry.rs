//! Directory entry types produced by the listing protocol.

use chrono::{DateTime, Local};
use serde::Serialize;

const S_IFDIR: u32 = 0o040000;
const S_IFREG: u32 = 0o100000;
const S_IFLNK: u32 = 0o120000;

/// What a listed name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
    SymlinkToDirectory,
    SymlinkToFile,
    BrokenSymlink,
}

impl EntryKind {
    /// Whether the entry can be entered like a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory | Self::SymlinkToDirectory)
    }

    /// Whether the entry is a symbolic link of any flavour.
    pub fn is_symlink(&self) -> bool {
        matches!(
            self,
            Self::SymlinkToDirectory | Self::SymlinkToFile | Self::BrokenSymlink
        )
    }
}

/// One row of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub kind: EntryKind,
    /// Raw permission string, e.g. `drwxr-x---`.
    pub permissions: String,
    pub size: u64,
    pub owner: String,
    pub group: String,
    pub links: u32,
    pub modified: DateTime<Local>,
    /// Link target as printed by `ls`, present only for symlinks.
    pub target: Option<String>,
}

impl DirectoryEntry {
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    pub fn is_symlink(&self) -> bool {
        self.kind.is_symlink()
    }

    /// Synthesized Unix mode: file type bits plus a fixed permission set.
    ///
    /// Directories get `0755`, everything else `0644`; the real bits are
    /// available in [`permissions`](Self::permissions).
    pub fn unix_mode(&self) -> u32 {
        match self.kind {
            EntryKind::Directory => S_IFDIR | 0o755,
            EntryKind::File => S_IFREG | 0o644,
            _ => S_IFLNK | 0o644,
        }
    }
}

/// Result of one composite listing round trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingResponse {
    /// The shell's working directory after the `cd` attempt.
    pub path: String,
    /// Entries in the order `ls -la` printed them.
    pub entries: Vec<DirectoryEntry>,
}

impl ListingResponse {
    /// Look up an entry by exact name.
    pub fn get(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}
