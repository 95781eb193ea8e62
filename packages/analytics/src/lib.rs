#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Views over the canonical survey dataset.
//!
//! Everything starts from [`filter::apply_filter`]; the map markers, the
//! per-point fact sheet and the dashboard distributions are all computed
//! from the resulting [`filter::FilteredDataset`] and translated through
//! the shared category vocabularies.

pub mod detail;
pub mod filter;
pub mod markers;
pub mod stats;

pub use detail::{fact_sheet, fact_sheet_at, select_record};
pub use filter::{FilteredDataset, apply_filter, covering_spec, date_bounds, filter_options};
pub use markers::build_map;
pub use stats::dashboard_stats;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use mesa_agua_source_models::{CanonicalRecord, Coordinates, Dataset, Fields};
    use serde_json::Value;

    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    pub fn record(key: &str, day: Option<NaiveDate>, fields: Value) -> CanonicalRecord {
        record_at(key, day, fields, -31.5, -64.2)
    }

    pub fn record_at(
        key: &str,
        day: Option<NaiveDate>,
        fields: Value,
        latitude: f64,
        longitude: f64,
    ) -> CanonicalRecord {
        let fields: Fields = match fields {
            Value::Object(map) => map.into_iter().collect(),
            _ => Fields::new(),
        };
        CanonicalRecord {
            coordinates: Some(Coordinates {
                latitude,
                longitude,
            }),
            timestamp: day.and_then(|d| d.and_hms_opt(0, 0, 0)),
            technology_key: key.to_string(),
            fields,
        }
    }

    pub fn dataset(records: Vec<CanonicalRecord>) -> Dataset {
        Dataset::from_records(records)
    }
}
