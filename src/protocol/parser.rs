//! Parsing of composite listing responses and `ls -la` rows.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::command::{ARROW, SEPARATOR};
use super::datetime::{month_number, parse_ls_datetime};
use super::entry::{DirectoryEntry, EntryKind, ListingResponse};
use crate::error::AdbShellError;
use crate::output::OutputSanitizer;
use crate::Result;

/// Parse the combined output of [`build_listing_command`].
///
/// The first non-blank line is the working directory; the remaining lines
/// before [`SEPARATOR`] are `ls -la` rows, and the lines after it are
/// symlink classification records. Unusable rows are skipped. The
/// separator is always printed by the composite command, so its absence
/// means the response is not a listing at all.
///
/// [`build_listing_command`]: super::build_listing_command
pub fn parse_listing_response(raw: &str) -> Result<ListingResponse> {
    let mut path: Option<String> = None;
    let mut rows = Vec::new();
    let mut records = Vec::new();
    let mut after_separator = false;

    for line in raw.split('\n') {
        let line = OutputSanitizer::trim_line_endings(line);
        if line.trim().is_empty() {
            continue;
        }
        if !after_separator && line.trim() == SEPARATOR {
            after_separator = true;
            continue;
        }

        if after_separator {
            records.push(line);
        } else if path.is_none() {
            path = Some(line.to_string());
        } else {
            rows.push(line);
        }
    }

    if !after_separator {
        return Err(AdbShellError::MalformedListing(format!(
            "separator missing from {} bytes of output",
            raw.len()
        )));
    }

    let mut entries: Vec<DirectoryEntry> = rows.into_iter().filter_map(parse_ls_line).collect();
    apply_symlink_types(&mut entries, &records);

    debug!(
        entries = entries.len(),
        symlink_records = records.len(),
        "parsed listing"
    );

    Ok(ListingResponse {
        path: path.unwrap_or_default(),
        entries,
    })
}

/// Split off the next whitespace-delimited field.
///
/// Returns the field and the remainder, which still starts with the
/// delimiting whitespace.
fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

fn looks_like_permissions(perms: &str) -> bool {
    perms.len() >= 10 && matches!(perms.as_bytes()[0], b'-' | b'd' | b'l' | b'c' | b'b' | b'p' | b's')
}

/// Parse one `ls -la` row.
///
/// Returns `None` for rows that carry no entry: `total` lines, permission
/// errors, rows with `?` placeholders from a failed stat, `.`/`..`, and
/// anything without the seven leading columns. Everything after the time
/// column (minus one separating space) is the name, so embedded spaces
/// survive.
pub fn parse_ls_line(line: &str) -> Option<DirectoryEntry> {
    if line.contains("Permission denied") || line.starts_with("total") || line.contains('?') {
        trace!("skipping ls row: {}", line);
        return None;
    }

    let (perms, rest) = next_field(line)?;
    if !looks_like_permissions(perms) {
        trace!("skipping non-entry row: {}", line);
        return None;
    }
    let (links, rest) = next_field(rest)?;
    let (owner, rest) = next_field(rest)?;
    let (group, rest) = next_field(rest)?;

    let (size, rest) = next_field(rest)?;
    // Device nodes print "major, minor" where the size would be.
    let (size, rest) = if size.ends_with(',') {
        let (_minor, rest) = next_field(rest)?;
        (0, rest)
    } else {
        (size.parse().unwrap_or(0), rest)
    };

    let (date_head, rest) = next_field(rest)?;
    let (date, rest) = if month_number(date_head).is_some() {
        let (day, rest) = next_field(rest)?;
        (format!("{date_head} {day}"), rest)
    } else {
        (date_head.to_string(), rest)
    };
    let (time, rest) = next_field(rest)?;

    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    let is_symlink = perms.starts_with('l');

    let (name, target) = match rest.split_once(" -> ") {
        Some((name, target)) if is_symlink => (name, Some(target.to_string())),
        _ => (rest, None),
    };

    if name.is_empty() || name == "." || name == ".." {
        return None;
    }

    let kind = if perms.starts_with('d') {
        EntryKind::Directory
    } else if is_symlink {
        EntryKind::SymlinkToFile
    } else {
        EntryKind::File
    };

    Some(DirectoryEntry {
        name: name.to_string(),
        kind,
        permissions: perms.to_string(),
        size,
        owner: owner.to_string(),
        group: group.to_string(),
        links: links.parse().unwrap_or(1),
        modified: parse_ls_datetime(&date, time),
        target,
    })
}

/// Parse a `name->D|F|B` record into the name and its class letter.
pub fn parse_symlink_record(record: &str) -> Option<(&str, char)> {
    let (name, class) = record.rsplit_once(ARROW)?;
    let mut chars = class.trim_end().chars();
    let letter = chars.next()?;
    if chars.next().is_some() || name.is_empty() {
        return None;
    }
    Some((name, letter))
}

/// Refine symlink entries with the classification records.
///
/// `D` makes a link a directory link, `F` a file link and `B` a broken
/// link. Records naming unknown entries or non-links are ignored.
pub fn apply_symlink_types(entries: &mut [DirectoryEntry], records: &[&str]) {
    let index: HashMap<String, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.name.clone(), i))
        .collect();

    for record in records {
        let Some((name, letter)) = parse_symlink_record(record) else {
            trace!("ignoring symlink record: {}", record);
            continue;
        };
        let Some(&i) = index.get(name) else {
            continue;
        };
        let entry = &mut entries[i];
        if !entry.is_symlink() {
            continue;
        }
        entry.kind = match letter {
            'D' => EntryKind::SymlinkToDirectory,
            'F' => EntryKind::SymlinkToFile,
            'B' => EntryKind::BrokenSymlink,
            _ => entry.kind,
        };
    }
}
