//! Parsing of CMS export timestamps
//!
//! The export step writes dates in whatever shape its YAML emitter prefers,
//! often shifted into the local time zone of the machine that ran it.
//! Everything here parses to a `DateTime<FixedOffset>` so the original
//! offset survives until [`to_utc`] is applied.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f %:z", "%Y-%m-%d %H:%M:%S%.f %z"];
const UTC_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f Z", "%Y-%m-%d %H:%M:%S%.fZ"];

/// Parse an export timestamp
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f] ±HH:MM`,
/// `YYYY-MM-DD HH:MM:SS[.f] Z` and bare `YYYY-MM-DD` (midnight UTC).
pub fn parse(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    for format in UTC_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
}

/// Undo the time zone shift applied on export: same instant, tagged UTC
pub fn to_utc(date: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    date.with_timezone(&Utc).fixed_offset()
}
