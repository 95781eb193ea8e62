//! Shared parsing utilities for survey answers.
//!
//! Date and geolocation coercion used by the normalizer.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use mesa_agua_source_models::Coordinates;
use serde_json::Value;

/// Naive datetime layouts tried after RFC 3339, most specific first.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Date-only layouts, resolved to midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parses a survey date or datetime string.
///
/// Offsets are dropped rather than converted so the result keeps the
/// surveyor's wall-clock time and calendar date.
#[must_use]
pub fn parse_survey_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parses a date from a field value. Only strings carry dates.
#[must_use]
pub fn parse_date_value(value: &Value) -> Option<NaiveDateTime> {
    value.as_str().and_then(parse_survey_date)
}

/// Extracts `(latitude, longitude)` from a geolocation list.
///
/// Requires a list of at least two elements whose first two are numbers
/// or numeric strings. Anything else yields `None`.
#[must_use]
pub fn parse_geolocation(value: &Value) -> Option<Coordinates> {
    let items = value.as_array()?;
    if items.len() < 2 {
        return None;
    }
    Some(Coordinates {
        latitude: coerce_f64(&items[0])?,
        longitude: coerce_f64(&items[1])?,
    })
}

fn coerce_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
