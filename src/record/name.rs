//! Record names: the only place a record's identity is stored.
//!
//! Format (version `r1`):
//!
//! ```text
//! r1_<location>_<sublocation>_<source>_<YYYYMMDDTHHMMSS>.csv
//! ```
//!
//! Identifiers are ASCII alphanumerics and `-`, so `_` only ever appears as
//! the delimiter. Anything that does not match exactly is a [`NameError`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

use super::{RecordId, Source};

pub const VERSION: &str = "r1";
pub const EXTENSION: &str = ".csv";
const DELIMITER: char = '_';
const FIELD_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("'{0}' does not end in .csv")]
    Extension(String),

    #[error("unknown name format '{0}'")]
    Version(String),

    #[error("expected 5 '_'-separated fields, found {0}")]
    FieldCount(usize),

    #[error("invalid identifier '{0}'")]
    Identifier(String),

    #[error("unknown source '{0}'")]
    Source(String),

    #[error("invalid timestamp '{0}'")]
    Timestamp(String),
}

/// Whether `s` may be used as a location or sublocation name.
pub fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Builds the stored name for a record.
pub fn encode(id: &RecordId) -> String {
    format!(
        "{VERSION}_{}_{}_{}_{}{EXTENSION}",
        id.location(),
        id.sublocation(),
        id.source(),
        format_timestamp(&id.captured_at())
    )
}

/// Recovers a record's identity from its stored name.
pub fn decode(name: &str) -> Result<RecordId, NameError> {
    let stem = name
        .strip_suffix(EXTENSION)
        .ok_or_else(|| NameError::Extension(name.to_string()))?;

    let parts: Vec<&str> = stem.split(DELIMITER).collect();
    if parts[0] != VERSION {
        return Err(NameError::Version(parts[0].to_string()));
    }
    if parts.len() != FIELD_COUNT {
        return Err(NameError::FieldCount(parts.len()));
    }

    let source = parts[3].parse::<Source>()?;
    let captured_at = parse_timestamp(parts[4])?;

    RecordId::new(parts[1], parts[2], source, captured_at)
}

fn format_timestamp(ts: &NaiveDateTime) -> String {
    format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}",
        ts.year(),
        ts.month(),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second()
    )
}

// Fixed-width digits only; signs, padding and separators are rejected.
fn parse_timestamp(s: &str) -> Result<NaiveDateTime, NameError> {
    let invalid = || NameError::Timestamp(s.to_string());

    let bytes = s.as_bytes();
    if bytes.len() != 15 || bytes[8] != b'T' {
        return Err(invalid());
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(idx, b)| idx == 8 || b.is_ascii_digit());
    if !digits_ok {
        return Err(invalid());
    }

    let number = |range: std::ops::Range<usize>| s[range].parse::<u32>().map_err(|_| invalid());

    let year = number(0..4)? as i32;
    let (month, day) = (number(4..6)?, number(6..8)?);
    let (hour, minute, second) = (number(9..11)?, number(11..13)?, number(13..15)?);

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(invalid)
}

// -- Tests -------------------------------------------------------------------
