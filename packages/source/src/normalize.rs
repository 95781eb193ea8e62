//! Survey submission normalization.
//!
//! Turns raw submissions (arbitrarily nested JSON objects whose field
//! names carry group prefixes such as `grupo_obra/Estado_de_la_obra`)
//! into [`CanonicalRecord`]s:
//!
//! 1. Nested objects are flattened into dotted keys.
//! 2. Every key is de-namespaced to its last `.`/`/` segment. Colliding
//!    short names overwrite one another: the last value wins and keeps
//!    the column position of the first occurrence.
//! 3. Coordinates come from [`GEOLOCATION_FIELD`].
//! 4. The timestamp column is chosen once per batch (see
//!    [`DateSource::resolve`]).
//!
//! Submissions that are not JSON objects are skipped so one bad record
//! never prevents the rest of the batch from loading.

use chrono::NaiveDateTime;
use indexmap::IndexSet;
use mesa_agua_source_models::{
    CanonicalRecord, Dataset, Fields, GEOLOCATION_FIELD, TECHNOLOGY_FIELD, value_text,
};
use mesa_agua_water_point_models::Technology;
use serde_json::{Map, Value};

use crate::SourceError;
use crate::parsing::{parse_date_value, parse_geolocation};

/// Substrings identifying the survey date column, any of which matches.
///
/// Columns are tested in dataset column order and the first column
/// containing any of these (case-insensitive) is the date column.
pub const DATE_COLUMN_KEYWORDS: &[&str] = &["fecha", "relevamiento"];

/// Where record timestamps come from for a whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSource {
    /// Parse each row's value in this column.
    Column(String),
    /// No date column exists: every record gets the fetch time.
    FetchTime(NaiveDateTime),
}

impl DateSource {
    /// Picks the date column for a batch of cleaned rows.
    ///
    /// The column order of a batch is the order in which names first
    /// appear across its rows. Falls back to `fetched_at` when no column
    /// matches [`DATE_COLUMN_KEYWORDS`], which is expected for legacy
    /// submissions without a date question, and when the chosen column
    /// parses for no row at all. A column that parses for some rows is
    /// kept; the other rows are left undated.
    #[must_use]
    pub fn resolve(rows: &[Fields], fetched_at: NaiveDateTime) -> Self {
        let columns: IndexSet<&str> = rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();

        let Some(name) = columns.into_iter().find(|name| {
            let name = name.to_lowercase();
            DATE_COLUMN_KEYWORDS.iter().any(|k| name.contains(k))
        }) else {
            return Self::FetchTime(fetched_at);
        };

        let column = Self::Column(name.to_string());
        if rows.iter().any(|row| column.timestamp(row).is_some()) {
            column
        } else {
            log::warn!(
                "No value of date column '{name}' parses, stamping records with fetch time {fetched_at}"
            );
            Self::FetchTime(fetched_at)
        }
    }

    /// Timestamp for one row. `None` when the row's value is missing or
    /// unparseable.
    #[must_use]
    pub fn timestamp(&self, fields: &Fields) -> Option<NaiveDateTime> {
        match self {
            Self::Column(name) => fields.get(name).and_then(parse_date_value),
            Self::FetchTime(at) => Some(*at),
        }
    }
}

/// Strips structural prefixes: everything up to the last `.`, then
/// everything up to the last `/`.
#[must_use]
pub fn denamespace(key: &str) -> &str {
    let tail = key.rsplit('.').next().unwrap_or(key);
    tail.rsplit('/').next().unwrap_or(tail)
}

/// Flattens and de-namespaces one raw submission.
///
/// # Errors
///
/// Returns [`SourceError::Normalization`] if the submission is not a
/// JSON object.
pub fn clean_submission(raw: &Value) -> Result<Fields, SourceError> {
    let Value::Object(object) = raw else {
        return Err(SourceError::Normalization {
            message: format!("expected a JSON object, got {}", kind(raw)),
        });
    };

    let mut flat = Vec::new();
    flatten_into(object, None, &mut flat);

    let mut fields = Fields::with_capacity(flat.len());
    for (key, value) in flat {
        fields.insert(denamespace(&key).to_string(), value);
    }
    Ok(fields)
}

fn flatten_into(object: &Map<String, Value>, prefix: Option<&str>, out: &mut Vec<(String, Value)>) {
    for (key, value) in object {
        let key = prefix.map_or_else(|| key.clone(), |p| format!("{p}.{key}"));
        match value {
            Value::Object(nested) => flatten_into(nested, Some(&key), out),
            _ => out.push((key, value.clone())),
        }
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Builds the canonical record for one cleaned row.
#[must_use]
pub fn normalize_fields(fields: Fields, dates: &DateSource) -> CanonicalRecord {
    let coordinates = fields.get(GEOLOCATION_FIELD).and_then(parse_geolocation);
    let timestamp = dates.timestamp(&fields);
    let technology_key = fields
        .get(TECHNOLOGY_FIELD)
        .and_then(value_text)
        .unwrap_or_else(|| Technology::OTHER_KEY.to_string());

    CanonicalRecord {
        coordinates,
        timestamp,
        technology_key,
        fields,
    }
}

/// Normalizes a batch of raw submissions into a [`Dataset`].
///
/// Malformed submissions are skipped with a warning and records without
/// coordinates are dropped. `fetched_at` is the shared fallback
/// timestamp when the batch has no date column.
#[must_use]
pub fn normalize_batch(raw: &[Value], fetched_at: NaiveDateTime) -> Dataset {
    let rows: Vec<Fields> = raw
        .iter()
        .enumerate()
        .filter_map(|(index, submission)| match clean_submission(submission) {
            Ok(fields) => Some(fields),
            Err(e) => {
                log::warn!("Skipping submission #{index}: {e}");
                None
            }
        })
        .collect();

    let dates = DateSource::resolve(&rows, fetched_at);
    match &dates {
        DateSource::Column(name) => log::debug!("Using '{name}' as the survey date column"),
        DateSource::FetchTime(at) => {
            log::info!("No usable survey date column, stamping records with fetch time {at}");
        }
    }

    let records: Vec<CanonicalRecord> = rows
        .into_iter()
        .map(|fields| normalize_fields(fields, &dates))
        .collect();

    let undated = records.iter().filter(|r| r.timestamp.is_none()).count();
    if undated > 0 {
        log::debug!("{undated} submissions have an unparseable survey date");
    }

    let total = records.len();
    let dataset = Dataset::from_records(records);
    if dataset.len() < total {
        log::info!(
            "Dropped {} submissions without a usable geolocation",
            total - dataset.len()
        );
    }
    dataset
}
