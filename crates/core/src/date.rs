//! Calendar-date parsing and formatting.
//!
//! Dates coming from the API are treated as pure calendar dates: the
//! year-month-day written in the string is the date shown, regardless of any
//! time or offset that follows it. Nothing here consults the local time zone.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Placeholder rendered for absent or unparseable values.
pub const PLACEHOLDER: &str = "-";

/// Wire format for query parameters (`yyyy-MM-dd`).
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// On-screen and export format (`dd/MM/yyyy`).
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Zone-less date-time layouts accepted after the RFC formats.
const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Format a date for the wire (`2024-03-05`).
pub fn to_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Format a date for display (`05/03/2024`).
pub fn to_display(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Parse the calendar date out of an API date value.
///
/// Accepts `yyyy-MM-dd`, RFC 3339 date-times (`2024-03-05T00:00:00Z`,
/// `2024-03-05T21:00:00-03:00`), RFC 2822 (`Tue, 05 Mar 2024 00:00:00 GMT`)
/// and naive date-times (`2024-03-05 10:00:00`, `2024-03-05T10:00:00.123`).
/// Returns `None` for anything else.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT) {
        return Some(date);
    }

    // `date_naive` on a fixed-offset value keeps the date as written.
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }

    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|dt| dt.date())
}

/// Render an optional API date value as `dd/MM/yyyy`, or [`PLACEHOLDER`].
pub fn display_date(raw: Option<&str>) -> String {
    raw.and_then(parse_calendar_date)
        .map(to_display)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
