//! `FileFilter`: hidden/size/date metadata predicate and the human
//! size/date parsers that feed it (§4.5).

use crate::error::HaybaleError;
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use std::fs::Metadata;
use std::path::Path;

const BYTES_PER_KB: u64 = 1024;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Parse a human size string: `<digits>[KB|MB]`, case-insensitive unit,
/// missing unit means KB.
pub fn parse_size(input: &str) -> Result<u64, HaybaleError> {
    let err = |reason: &str| HaybaleError::InvalidSize {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    let upper = trimmed.to_uppercase();
    let (digits, multiplier) = if let Some(d) = upper.strip_suffix("KB") {
        (d, BYTES_PER_KB)
    } else if let Some(d) = upper.strip_suffix("MB") {
        (d, BYTES_PER_MB)
    } else {
        (upper.as_str(), BYTES_PER_KB)
    };

    let digits = digits.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err("expected digits, optionally followed by KB or MB"));
    }
    let value: u64 = digits.parse().map_err(|_| err("value out of range"))?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| err("value out of range"))
}

/// Parse a human date: ISO-8601 `YYYY-MM-DD` (local midnight) or a
/// relative `<N>d`/`<N>w`/`<N>m` offset from `now`.
pub fn parse_date(input: &str, now: DateTime<Local>) -> Result<DateTime<Local>, HaybaleError> {
    let err = |reason: &str| HaybaleError::InvalidDate {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let naive_midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| err("invalid date"))?;
        return Local
            .from_local_datetime(&naive_midnight)
            .single()
            .ok_or_else(|| err("ambiguous local midnight"));
    }

    if let Some((digits, unit)) = split_relative(trimmed) {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err("expected digits followed by d, w, or m"));
        }
        let n: i64 = digits.parse().map_err(|_| err("value out of range"))?;
        let days = match unit {
            'd' => n,
            'w' => n * 7,
            'm' => n * 30,
            _ => unreachable!(),
        };
        return Ok(now - Duration::days(days));
    }

    Err(err(
        "expected YYYY-MM-DD or a relative offset like 7d, 2w, 1m",
    ))
}

fn split_relative(s: &str) -> Option<(&str, char)> {
    let last = s.chars().last()?;
    if matches!(last, 'd' | 'w' | 'm') {
        Some((&s[..s.len() - 1], last))
    } else {
        None
    }
}

/// Hidden -> size -> date decision order (§4.5). Missing bounds are
/// permissive.
pub struct FileFilter {
    pub include_hidden: bool,
    pub min_size_bytes: Option<u64>,
    pub max_size_bytes: Option<u64>,
    pub modified_after: Option<DateTime<Local>>,
    pub modified_before: Option<DateTime<Local>>,
}

impl FileFilter {
    pub fn matches(&self, path: &Path, metadata: &Metadata) -> bool {
        if !self.include_hidden && is_hidden(path) {
            return false;
        }

        let size = metadata.len();
        if let Some(min) = self.min_size_bytes {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.max_size_bytes {
            if size > max {
                return false;
            }
        }

        if self.modified_after.is_some() || self.modified_before.is_some() {
            let Ok(modified) = metadata.modified() else {
                return false;
            };
            let modified: DateTime<Local> = modified.into();
            if let Some(after) = self.modified_after {
                if modified < after {
                    return false;
                }
            }
            if let Some(before) = self.modified_before {
                if modified > before {
                    return false;
                }
            }
        }

        true
    }
}

/// Basename begins with `.`, excluding the `.`/`..` traversal entries.
pub fn is_hidden(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.starts_with('.') && name != "." && name != "..",
        None => false,
    }
}
