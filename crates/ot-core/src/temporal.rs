//! # Temporal Coercion: Lenient Date Parsing
//!
//! Turns the value stored at a date-keyed leaf into a [`DateValue`].
//!
//! ## Accepted Inputs
//!
//! - RFC 3339 / ISO-8601 strings with any offset (converted to UTC),
//!   including basic-format offsets (`+0000`) and minute precision
//!   (`2016-10-05T12:00Z`, `2016-10-05T12:00+02:00`).
//! - RFC 2822 strings (`Wed, 01 Jan 2020 00:00:00 +0000`).
//! - Naive date-times `YYYY-MM-DDTHH:MM[:SS[.fff]]` or with a space
//!   separator, assumed UTC.
//! - Date-only `YYYY-MM-DD`, and the reduced forms `YYYY-MM` and `YYYY`,
//!   read as UTC midnight on the first day of the period.
//! - Numbers, read as milliseconds since the Unix epoch.
//!
//! Everything else yields [`DateValue::Invalid`]. This parser never fails:
//! an unparseable leaf is data the caller can inspect, not an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::document::{DateValue, Document};

/// Offset-aware layouts tried after RFC 3339 and RFC 2822.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

/// Naive date-time layouts tried after the offset-aware formats.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Coerce a leaf to a date.
pub fn parse_date(leaf: &Document) -> DateValue {
    let parsed = match leaf {
        Document::Date(d) => return d.clone(),
        Document::String(s) => parse_str(s),
        Document::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    };

    match parsed {
        Some(dt) => DateValue::Valid(dt),
        None => {
            let raw = match leaf {
                Document::String(s) => s.clone(),
                other => other.to_json().to_string(),
            };
            tracing::trace!(raw = %raw, "date leaf did not parse; keeping invalid marker");
            DateValue::Invalid(raw)
        }
    }
}

fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // A trailing `Z` on a layout RFC 3339 rejects (no seconds) is UTC.
    let local = s.strip_suffix(['Z', 'z']).unwrap_or(s);
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(local, fmt) {
            return Some(naive.and_utc());
        }
    }
    if local.len() != s.len() {
        return None;
    }

    parse_calendar_date(s)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    match s.split('-').collect::<Vec<_>>().as_slice() {
        [_, _, _] => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
        [year, month] if year.len() == 4 && month.len() == 2 => {
            if !all_digits(year) || !all_digits(month) {
                return None;
            }
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
        [year] if year.len() == 4 && all_digits(year) => {
            NaiveDate::from_ymd_opt(year.parse().ok()?, 1, 1)
        }
        _ => None,
    }
}
