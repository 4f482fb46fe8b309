//! Listing protocol integration tests.
//!
//! These tests feed captured device output through the public parsing API.

use chrono::{Datelike, Timelike};

use adb_shellfs::protocol::{build_listing_command, parse_listing_response, SEPARATOR};
use adb_shellfs::{AdbShellError, EntryKind, ErrorKind, OutputSanitizer};

/// `/sdcard` on a toybox device, as returned by the session.
const SDCARD: &str = "/storage/emulated/0\n\
total 96\n\
drwxrws--x 14 media_rw media_rw 3452 2024-03-02 18:41 .\n\
drwx--x--x  4 root     sdcard_rw 4096 2023-11-20 09:02 ..\n\
drwxrws---  2 u0_a173  media_rw 3452 2024-01-15 09:30 Alarms\n\
drwxrws---  5 u0_a173  media_rw 3452 2024-02-28 22:17 DCIM\n\
drwxrws---  4 u0_a173  media_rw 3452 2024-03-01 08:05 Download\n\
-rw-rw----  1 u0_a173  media_rw    0 2023-11-20 09:03 .nomedia\n\
-rw-rw----  1 u0_a173  media_rw 48213 2024-03-02 18:41 Screenshot 2024-03-02.png\n\
lrwxrwxrwx  1 root     root       21 2024-01-10 12:00 camera -> /storage/emulated/0/DCIM\n\
lrwxrwxrwx  1 root     root        9 2024-01-10 12:00 old -> /gone/old\n\
lrwxrwxrwx  1 root     root       12 2024-01-10 12:00 readme -> Download/README\n\
<<<SEP>>>\n\
camera->D\n\
old->B\n\
readme->F\n";

#[test]
fn test_full_sdcard_listing() {
    let listing = parse_listing_response(SDCARD).unwrap();

    assert_eq!(listing.path, "/storage/emulated/0");
    assert_eq!(listing.entries.len(), 8);

    let dirs: Vec<&str> = listing
        .entries
        .iter()
        .filter(|e| e.kind == EntryKind::Directory)
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(dirs, ["Alarms", "DCIM", "Download"]);

    let shot = listing.get("Screenshot 2024-03-02.png").unwrap();
    assert_eq!(shot.kind, EntryKind::File);
    assert_eq!(shot.size, 48213);
    assert_eq!(shot.owner, "u0_a173");
    assert_eq!(shot.group, "media_rw");
    assert_eq!(shot.links, 1);
    assert_eq!(
        (shot.modified.year(), shot.modified.month(), shot.modified.day()),
        (2024, 3, 2)
    );
    assert_eq!((shot.modified.hour(), shot.modified.minute()), (18, 41));

    let camera = listing.get("camera").unwrap();
    assert_eq!(camera.kind, EntryKind::SymlinkToDirectory);
    assert!(camera.is_dir());
    assert_eq!(camera.target.as_deref(), Some("/storage/emulated/0/DCIM"));

    assert_eq!(listing.get("old").unwrap().kind, EntryKind::BrokenSymlink);
    assert_eq!(listing.get("readme").unwrap().kind, EntryKind::SymlinkToFile);
    assert!(listing.get(".nomedia").is_some());
}

#[test]
fn test_unix_modes() {
    let listing = parse_listing_response(SDCARD).unwrap();

    assert_eq!(listing.get("DCIM").unwrap().unix_mode() & 0o170000, 0o040000);
    assert_eq!(listing.get("readme").unwrap().unix_mode() & 0o170000, 0o120000);
    assert_eq!(listing.get(".nomedia").unwrap().unix_mode(), 0o100644);
}

#[test]
fn test_colored_crlf_output() {
    // Some shells colorize and translate newlines; the session strips both.
    let raw = b"/sdcard\r\n\
total 8\r\n\
drwxrws--- 2 u0_a173 media_rw 3452 2024-01-15 09:30 \x1b[1;34mMusic\x1b[0m\r\n\
<<<SEP>>>\r\n";
    let clean = OutputSanitizer::strip_ansi(raw);
    let listing = parse_listing_response(&clean).unwrap();

    assert_eq!(listing.path, "/sdcard");
    assert_eq!(listing.get("Music").unwrap().kind, EntryKind::Directory);
}

#[test]
fn test_unreadable_directory() {
    let raw = format!("/data\nls: .: Permission denied\n{SEPARATOR}\n");
    let listing = parse_listing_response(&raw).unwrap();
    assert_eq!(listing.path, "/data");
    assert!(listing.entries.is_empty());
}

#[test]
fn test_truncated_response_is_rejected() {
    let err = parse_listing_response("/sdcard\ntotal 0\n").unwrap_err();
    assert!(matches!(err, AdbShellError::MalformedListing(_)));
    assert_eq!(err.kind(), ErrorKind::GenericIO);
}

#[test]
fn test_listing_serializes_for_clients() {
    let listing = parse_listing_response(SDCARD).unwrap();
    let json = serde_json::to_value(&listing).unwrap();

    assert_eq!(json["path"], "/storage/emulated/0");
    let camera = json["entries"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["name"] == "camera")
        .unwrap();
    assert_eq!(camera["kind"], "symlink_to_directory");
    assert_eq!(camera["target"], "/storage/emulated/0/DCIM");
}

#[test]
fn test_command_targets_requested_path() {
    let cmd = build_listing_command("/sdcard/My Files");
    assert!(cmd.starts_with("cd \"/sdcard/My Files\" 2>/dev/null; pwd; ls -la;"));
    assert!(cmd.contains(SEPARATOR));
}
