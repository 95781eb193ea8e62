#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter, map marker, fact sheet and dashboard types.
//!
//! These are the input and output shapes of the views built on top of
//! the canonical dataset: the filter panel, the map, the per-point fact
//! sheet, and the summary dashboard.

use chrono::NaiveDate;
use mesa_agua_source_models::Coordinates;
use serde::{Deserialize, Serialize};

/// Technology choice meaning "do not filter by technology".
pub const ALL_TECHNOLOGIES: &str = "Todas";

/// Usage choice meaning "do not filter by usage state".
pub const ALL_USAGE_STATES: &str = "Todos";

/// Which technology to keep, by display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "label", rename_all = "snake_case")]
pub enum TechnologySelector {
    /// Keep every technology.
    All,
    /// Keep records whose technology has this display title.
    Label(String),
}

impl TechnologySelector {
    /// Parses a filter panel choice; [`ALL_TECHNOLOGIES`] means all.
    #[must_use]
    pub fn from_choice(choice: &str) -> Self {
        if choice == ALL_TECHNOLOGIES {
            Self::All
        } else {
            Self::Label(choice.to_string())
        }
    }
}

/// Which usage state to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum UsageSelector {
    /// Keep every usage state.
    All,
    /// Keep records whose usage answer equals this value exactly.
    Value(String),
}

impl UsageSelector {
    /// Parses a filter panel choice; [`ALL_USAGE_STATES`] means all.
    #[must_use]
    pub fn from_choice(choice: &str) -> Self {
        if choice == ALL_USAGE_STATES {
            Self::All
        } else {
            Self::Value(choice.to_string())
        }
    }
}

/// A conjunctive filter over the canonical dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// First day included.
    pub from: NaiveDate,
    /// Last day included.
    pub to: NaiveDate,
    /// Technology to keep.
    pub technology: TechnologySelector,
    /// Usage state to keep.
    pub usage: UsageSelector,
}

impl FilterSpec {
    /// A spec over `[from, to]` that keeps every technology and usage
    /// state.
    #[must_use]
    pub const fn date_range(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from,
            to,
            technology: TechnologySelector::All,
            usage: UsageSelector::All,
        }
    }
}

/// Choices offered by the filter panel for a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Earliest record date, `None` when no record is dated.
    pub date_from: Option<NaiveDate>,
    /// Latest record date, `None` when no record is dated.
    pub date_to: Option<NaiveDate>,
    /// [`ALL_TECHNOLOGIES`] followed by every technology title.
    pub technologies: Vec<String>,
    /// [`ALL_USAGE_STATES`] followed by the sorted distinct usage answers.
    pub usage_states: Vec<String>,
}

/// One point on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    /// Latitude, also used to correlate clicks with records.
    pub latitude: f64,
    /// Longitude, also used to correlate clicks with records.
    pub longitude: f64,
    /// Popup title.
    pub title: String,
    /// Raw technology key.
    pub technology_key: String,
    /// Marker colour name.
    pub marker_color: String,
    /// Popup title colour.
    pub hex: String,
    /// Survey date as `DD/MM/YYYY`.
    pub date: String,
    /// Usage answer, `-` when absent.
    pub usage: String,
}

/// Markers plus where to centre the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Mean position of all markers, `None` when there are none.
    pub center: Option<Coordinates>,
    /// One marker per record.
    pub markers: Vec<MapMarker>,
}

/// A labelled line of a fact sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactEntry {
    /// Line label.
    pub label: String,
    /// Displayed value.
    pub value: String,
}

/// Details of one selected water point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactSheet {
    /// Technology title.
    pub title: String,
    /// Photo of the water point, when one was uploaded.
    pub image_url: Option<String>,
    /// Location of the selected record.
    pub coordinates: Coordinates,
    /// Labelled answers, in display order.
    pub entries: Vec<FactEntry>,
}

/// Number of records with one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Display label.
    pub label: String,
    /// Number of records.
    pub count: u64,
}

/// Frequency distributions for the summary dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Number of filtered records.
    pub total: u64,
    /// By technology title.
    pub technologies: Vec<CategoryCount>,
    /// By work condition.
    pub conditions: Vec<CategoryCount>,
    /// By water quality.
    pub qualities: Vec<CategoryCount>,
    /// By origin of technical assistance.
    pub assistance: Vec<CategoryCount>,
    /// By user type.
    pub users: Vec<CategoryCount>,
    /// By problem, over records not in use only.
    pub problems: Vec<CategoryCount>,
    /// Whether no record reported being out of use.
    pub all_in_use: bool,
}
