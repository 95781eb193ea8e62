#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The canonical water-point survey record.
//!
//! Survey submissions have no fixed schema: field names drift between
//! form versions and are matched by keyword. A [`CanonicalRecord`] keeps
//! the handful of fields every consumer needs (coordinates, timestamp,
//! technology key) as typed values and preserves every other answer,
//! in column order, under its de-namespaced name.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use mesa_agua_water_point_models::Technology;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker returned by keyword lookups that find nothing usable.
pub const NOT_RECORDED: &str = "No reg.";

/// Name under which the resolved timestamp is visible to keyword lookup.
pub const TIMESTAMP_FIELD: &str = "fecha_limpia";

/// Field holding the `[latitude, longitude, ...]` list.
pub const GEOLOCATION_FIELD: &str = "_geolocation";

/// Field holding the raw technology key.
pub const TECHNOLOGY_FIELD: &str = "tecnolog";

/// Field holding the free-text "is it in use?" answer.
pub const USAGE_FIELD: &str = "En_uso";

/// Display format for dates.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Cleaned answers of one submission, in column order.
pub type Fields = IndexMap<String, Value>;

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Whether both axes are within `tolerance` degrees of `other`.
    #[must_use]
    pub fn approx_eq(self, other: Self, tolerance: f64) -> bool {
        (self.latitude - other.latitude).abs() < tolerance
            && (self.longitude - other.longitude).abs() < tolerance
    }
}

/// A survey submission normalized to the canonical schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    /// Location of the water point. `None` when the submission had no
    /// usable geolocation; such records never reach a [`Dataset`].
    pub coordinates: Option<Coordinates>,
    /// When the survey was taken, in the surveyor's local time. `None`
    /// when the date column exists but this row's value did not parse.
    pub timestamp: Option<NaiveDateTime>,
    /// Raw technology code, [`Technology::OTHER_KEY`] when absent.
    pub technology_key: String,
    /// Every answer under its de-namespaced name.
    pub fields: Fields,
}

impl CanonicalRecord {
    /// Resolved technology, [`Technology::Otros`] when unrecognized.
    #[must_use]
    pub fn technology(&self) -> Technology {
        Technology::resolve(Some(&self.technology_key))
    }

    /// Raw value of an exactly-named field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Stringified value of an exactly-named field, `None` when missing
    /// or not recorded.
    #[must_use]
    pub fn field_text(&self, name: &str) -> Option<String> {
        self.field(name).and_then(value_text)
    }

    /// The timestamp formatted as `DD/MM/YYYY`.
    #[must_use]
    pub fn date_string(&self) -> Option<String> {
        self.timestamp
            .map(|timestamp| timestamp.format(DATE_FORMAT).to_string())
    }

    /// Returns the value of the first field whose name contains any of
    /// `keywords` (case-insensitive).
    ///
    /// Fields are scanned in column order, with the resolved timestamp
    /// visible last as [`TIMESTAMP_FIELD`]. The first matching field
    /// decides the result even when its value is empty, in which case
    /// [`NOT_RECORDED`] is returned, as it is when nothing matches.
    #[must_use]
    pub fn find_value(&self, keywords: &[&str]) -> String {
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        let matches = |name: &str| {
            let name = name.to_lowercase();
            keywords.iter().any(|k| name.contains(k.as_str()))
        };

        if let Some((_, value)) = self.fields.iter().find(|(name, _)| matches(name)) {
            return value_text(value).unwrap_or_else(|| NOT_RECORDED.to_string());
        }
        if matches(TIMESTAMP_FIELD) {
            return self
                .date_string()
                .unwrap_or_else(|| NOT_RECORDED.to_string());
        }
        NOT_RECORDED.to_string()
    }
}

/// A set of records that all carry coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    records: Vec<CanonicalRecord>,
}

impl Dataset {
    /// Builds a dataset, dropping records without coordinates.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = CanonicalRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .filter(|record| record.coordinates.is_some())
                .collect(),
        }
    }

    /// The records, in source order.
    #[must_use]
    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Stringifies a field value for display.
///
/// Returns `None` for null, empty (after trimming) and the literal
/// `"none"` in any case. Lists are joined with `", "`.
#[must_use]
pub fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn record(fields: Value) -> CanonicalRecord {
        let fields = match fields {
            Value::Object(map) => map.into_iter().collect(),
            _ => Fields::new(),
        };
        CanonicalRecord {
            coordinates: Some(Coordinates {
                latitude: -31.5,
                longitude: -64.2,
            }),
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 1)
                .and_then(|d| d.and_hms_opt(10, 30, 0)),
            technology_key: "represa".to_string(),
            fields,
        }
    }

    #[test]
    fn finds_first_matching_field_in_column_order() {
        let mut rec = record(json!({}));
        rec.fields.insert("Estado_de_la_obra".into(), json!("bueno"));
        rec.fields.insert("Estado_general".into(), json!("malo"));
        assert_eq!(rec.find_value(&["estado"]), "bueno");
    }

    #[test]
    fn first_match_wins_even_when_empty() {
        let mut rec = record(json!({}));
        rec.fields.insert("Cual".into(), json!(""));
        rec.fields.insert("Cual_otro".into(), json!("cloro"));
        assert_eq!(rec.find_value(&["cual"]), NOT_RECORDED);
    }

    #[test]
    fn not_recorded_for_missing_null_and_none() {
        let rec = record(json!({"Usuario": null, "Calidad_del_agua": "None"}));
        assert_eq!(rec.find_value(&["Usuario"]), NOT_RECORDED);
        assert_eq!(rec.find_value(&["Calidad"]), NOT_RECORDED);
        assert_eq!(rec.find_value(&["inexistente"]), NOT_RECORDED);
    }

    #[test]
    fn timestamp_is_formatted_day_first() {
        let rec = record(json!({"En_uso": "si"}));
        assert_eq!(rec.find_value(&[TIMESTAMP_FIELD]), "01/05/2024");

        let mut undated = rec;
        undated.timestamp = None;
        assert_eq!(undated.find_value(&[TIMESTAMP_FIELD]), NOT_RECORDED);
    }

    #[test]
    fn numbers_and_lists_are_stringified() {
        let rec = record(json!({"Cantidad_de_familias_usuarias": 12, "tags": ["a", "b"]}));
        assert_eq!(rec.find_value(&["familias"]), "12");
        assert_eq!(rec.find_value(&["tags"]), "a, b");
    }

    #[test]
    fn unknown_technology_key_resolves_to_other() {
        let mut rec = record(json!({}));
        rec.technology_key = "molino".to_string();
        assert_eq!(rec.technology(), Technology::Otros);
    }

    #[test]
    fn dataset_drops_records_without_coordinates() {
        let located = record(json!({}));
        let mut unlocated = record(json!({}));
        unlocated.coordinates = None;
        let dataset = Dataset::from_records([located.clone(), unlocated]);
        assert_eq!(dataset.records(), &[located]);
    }

    #[test]
    fn approximate_coordinate_match() {
        let a = Coordinates {
            latitude: -31.5,
            longitude: -64.2,
        };
        let near = Coordinates {
            latitude: -31.5005,
            longitude: -64.2009,
        };
        let far = Coordinates {
            latitude: -31.502,
            longitude: -64.2,
        };
        assert!(a.approx_eq(near, 0.001));
        assert!(!a.approx_eq(far, 0.001));
    }
}
