#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the water-point survey server.
//!
//! These types are serialized to JSON for the REST API. They wrap the
//! analytics view types with the fetch warning, if any, so the frontend
//! can show why the data is empty.

use chrono::NaiveDate;
use mesa_agua_analytics_models::{
    DashboardStats, FilterOptions, FilterSpec, MapMarker, TechnologySelector, UsageSelector,
};
use mesa_agua_source_models::Coordinates;
use mesa_agua_water_point_models::Technology;
use serde::{Deserialize, Serialize};

/// Message returned when a detail lookup matches no record.
pub const NO_DATA_AT_POINT: &str = "No se encontraron datos para este punto.";

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body for 4xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// What went wrong.
    pub error: String,
}

impl ApiError {
    /// Wraps an error message.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// A technology with its display styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTechnology {
    /// Raw form key.
    pub key: String,
    /// Display title, also the value accepted by the `technology` filter.
    pub title: String,
    /// Marker colour name.
    pub marker_color: String,
    /// Chart colour.
    pub hex: String,
}

impl From<Technology> for ApiTechnology {
    fn from(technology: Technology) -> Self {
        let style = technology.style();
        Self {
            key: style.key.to_string(),
            title: style.title.to_string(),
            marker_color: style.marker_color.to_string(),
            hex: style.hex.to_string(),
        }
    }
}

/// One `(code, label)` pair of a category vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVocabularyEntry {
    /// Raw form code.
    pub code: String,
    /// Display label.
    pub label: String,
}

/// Filter query parameters shared by the data endpoints.
///
/// Omitted dates default to the dataset's date bounds. An omitted
/// selector, or the "all" choice, keeps every value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQueryParams {
    /// First day included (`YYYY-MM-DD`).
    pub from: Option<NaiveDate>,
    /// Last day included (`YYYY-MM-DD`).
    pub to: Option<NaiveDate>,
    /// Technology title, or `Todas`.
    pub technology: Option<String>,
    /// Usage answer, or `Todos`.
    pub usage: Option<String>,
}

impl FilterQueryParams {
    /// Builds the filter, filling missing dates from `bounds`.
    ///
    /// Without bounds (nothing in the dataset is dated) missing dates are
    /// left open.
    #[must_use]
    pub fn to_spec(&self, bounds: Option<(NaiveDate, NaiveDate)>) -> FilterSpec {
        let from = self
            .from
            .or_else(|| bounds.map(|(from, _)| from))
            .unwrap_or(NaiveDate::MIN);
        let to = self
            .to
            .or_else(|| bounds.map(|(_, to)| to))
            .unwrap_or(NaiveDate::MAX);

        FilterSpec {
            from,
            to,
            technology: self
                .technology
                .as_deref()
                .map_or(TechnologySelector::All, TechnologySelector::from_choice),
            usage: self
                .usage
                .as_deref()
                .map_or(UsageSelector::All, UsageSelector::from_choice),
        }
    }
}

/// Query parameters for the detail endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailQueryParams {
    /// Latitude of the clicked marker.
    pub lat: f64,
    /// Longitude of the clicked marker.
    pub lon: f64,
    /// First day included.
    pub from: Option<NaiveDate>,
    /// Last day included.
    pub to: Option<NaiveDate>,
    /// Technology title, or `Todas`.
    pub technology: Option<String>,
    /// Usage answer, or `Todos`.
    pub usage: Option<String>,
}

impl DetailQueryParams {
    /// The clicked point.
    #[must_use]
    pub const fn point(&self) -> Coordinates {
        Coordinates {
            latitude: self.lat,
            longitude: self.lon,
        }
    }

    /// The filter part of the query.
    #[must_use]
    pub fn filter(&self) -> FilterQueryParams {
        FilterQueryParams {
            from: self.from,
            to: self.to,
            technology: self.technology.clone(),
            usage: self.usage.clone(),
        }
    }
}

/// Filter panel choices.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFilters {
    /// Date bounds, technologies and usage states.
    #[serde(flatten)]
    pub options: FilterOptions,
    /// Why the dataset is empty, when the fetch failed.
    pub warning: Option<String>,
}

/// Markers for the map.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMarkers {
    /// The filter that was applied, dates resolved.
    pub filter: FilterSpec,
    /// Where to centre the map, `None` without markers.
    pub center: Option<Coordinates>,
    /// Number of markers.
    pub total: u64,
    /// One marker per filtered record.
    pub markers: Vec<MapMarker>,
    /// Why the dataset is empty, when the fetch failed.
    pub warning: Option<String>,
}

/// Dashboard distributions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStats {
    /// The filter that was applied, dates resolved.
    pub filter: FilterSpec,
    /// Record count and distributions.
    #[serde(flatten)]
    pub stats: DashboardStats,
    /// Why the dataset is empty, when the fetch failed.
    pub warning: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn missing_dates_default_to_bounds() {
        let params = FilterQueryParams {
            to: Some(date(2024, 6, 30)),
            ..FilterQueryParams::default()
        };
        let spec = params.to_spec(Some((date(2023, 1, 1), date(2024, 12, 31))));
        assert_eq!(spec.from, date(2023, 1, 1));
        assert_eq!(spec.to, date(2024, 6, 30));
        assert_eq!(spec.technology, TechnologySelector::All);
        assert_eq!(spec.usage, UsageSelector::All);
    }

    #[test]
    fn dates_are_open_without_bounds() {
        let spec = FilterQueryParams::default().to_spec(None);
        assert_eq!(spec.from, NaiveDate::MIN);
        assert_eq!(spec.to, NaiveDate::MAX);
    }

    #[test]
    fn all_choices_keep_everything() {
        let params = FilterQueryParams {
            technology: Some("Todas".to_string()),
            usage: Some("no".to_string()),
            ..FilterQueryParams::default()
        };
        let spec = params.to_spec(None);
        assert_eq!(spec.technology, TechnologySelector::All);
        assert_eq!(spec.usage, UsageSelector::Value("no".to_string()));
    }

    #[test]
    fn technology_serializes_with_styling() {
        let json = serde_json::to_value(ApiTechnology::from(Technology::Represa)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "key": "represa",
                "title": "Represa",
                "markerColor": "orange",
                "hex": "#FF8C00",
            })
        );
    }

    #[test]
    fn detail_params_split_into_point_and_filter() {
        let params = DetailQueryParams {
            lat: -31.5,
            lon: -64.2,
            from: Some(date(2024, 1, 1)),
            to: None,
            technology: None,
            usage: Some("si".to_string()),
        };
        assert_eq!(
            params.point(),
            Coordinates {
                latitude: -31.5,
                longitude: -64.2,
            }
        );
        assert_eq!(params.filter().usage.as_deref(), Some("si"));
        assert_eq!(params.filter().from, Some(date(2024, 1, 1)));
    }
}
