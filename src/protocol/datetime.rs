//! `ls -la` timestamp parsing.
//!
//! toolbox/toybox print `2024-01-15 09:30`; busybox and coreutils print
//! `Jan 15 09:30`, or `Jan 15  2019` for files older than six months.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Month number (1-12) for a three-letter abbreviation, any case.
pub fn month_number(token: &str) -> Option<u32> {
    if token.len() != 3 {
        return None;
    }
    let lowered = token.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lowered)
        .map(|i| i as u32 + 1)
}

/// Parse an `ls` date and time column into a local timestamp.
///
/// `date` is `YYYY-MM-DD` or `MMM DD` (year taken from the current local
/// date). `time` is `HH:MM`, or a four-digit year which then replaces the
/// assumed year with midnight as the time. Anything unparseable yields
/// the current time.
pub fn parse_ls_datetime(date: &str, time: &str) -> DateTime<Local> {
    let now = Local::now();
    parse_ls_datetime_at(date, time, now).unwrap_or(now)
}

/// Like [`parse_ls_datetime`], with an explicit reference "now" and no
/// fallback.
pub fn parse_ls_datetime_at(
    date: &str,
    time: &str,
    now: DateTime<Local>,
) -> Option<DateTime<Local>> {
    let (hour, minute, year_override) = parse_time_column(time.trim())?;
    let date = date.trim();

    let day = if date.contains('-') {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?
    } else {
        let mut parts = date.split_whitespace();
        let month = month_number(parts.next()?)?;
        let day: u32 = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        NaiveDate::from_ymd_opt(year_override.unwrap_or(now.year()), month, day)?
    };

    let naive = day.and_hms_opt(hour, minute, 0)?;
    Local.from_local_datetime(&naive).earliest()
}

fn parse_time_column(time: &str) -> Option<(u32, u32, Option<i32>)> {
    if let Some((h, m)) = time.split_once(':') {
        let hour: u32 = h.parse().ok()?;
        let minute: u32 = m.parse().ok()?;
        return (hour < 24 && minute < 60).then_some((hour, minute, None));
    }
    if time.len() == 4 && time.bytes().all(|b| b.is_ascii_digit()) {
        return Some((0, 0, Some(time.parse().ok()?)));
    }
    None
}
