//! Filter engine over the canonical dataset.
//!
//! A [`FilterSpec`] is applied as a conjunction of three predicates:
//! survey date within `[from, to]` (by calendar day), technology, and
//! usage state. Source order is preserved.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use mesa_agua_analytics_models::{
    ALL_TECHNOLOGIES, ALL_USAGE_STATES, FilterOptions, FilterSpec, TechnologySelector,
    UsageSelector,
};
use mesa_agua_source_models::{CanonicalRecord, Dataset, USAGE_FIELD};
use mesa_agua_water_point_models::Technology;

/// The records selected by a [`FilterSpec`].
///
/// Always the product of [`apply_filter`], so an empty instance means
/// "nothing matched", never "not filtered yet".
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredDataset<'a> {
    spec: FilterSpec,
    records: Vec<&'a CanonicalRecord>,
}

impl<'a> FilteredDataset<'a> {
    /// The spec these records were selected with.
    #[must_use]
    pub const fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// Matching records, in source order.
    #[must_use]
    pub fn records(&self) -> &[&'a CanonicalRecord] {
        &self.records
    }

    /// Number of matching records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Selects the records of `dataset` matching `spec`.
///
/// Records without a timestamp never fall inside a date range. A
/// technology title with no entry in the vocabulary matches nothing.
#[must_use]
pub fn apply_filter<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> FilteredDataset<'a> {
    let technology = match &spec.technology {
        TechnologySelector::All => None,
        TechnologySelector::Label(label) => {
            if let Some(tech) = Technology::from_title(label) {
                Some(tech)
            } else {
                log::debug!("No technology titled '{label}', filter matches nothing");
                return FilteredDataset {
                    spec: spec.clone(),
                    records: Vec::new(),
                };
            }
        }
    };

    let records = dataset
        .records()
        .iter()
        .filter(|record| in_date_range(record, spec.from, spec.to))
        .filter(|record| technology.is_none_or(|tech| tech.matches_key(&record.technology_key)))
        .filter(|record| match &spec.usage {
            UsageSelector::All => true,
            UsageSelector::Value(value) => {
                record.field_text(USAGE_FIELD).as_deref() == Some(value.as_str())
            }
        })
        .collect();

    FilteredDataset {
        spec: spec.clone(),
        records,
    }
}

fn in_date_range(record: &CanonicalRecord, from: NaiveDate, to: NaiveDate) -> bool {
    record
        .timestamp
        .is_some_and(|timestamp| (from..=to).contains(&timestamp.date()))
}

/// Earliest and latest survey dates, ignoring undated records.
#[must_use]
pub fn date_bounds(dataset: &Dataset) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = dataset
        .records()
        .iter()
        .filter_map(|record| record.timestamp.map(|t| t.date()));
    let first = dates.next()?;
    Some(dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d))))
}

/// The spec selecting the whole dated dataset, `None` when no record is
/// dated.
#[must_use]
pub fn covering_spec(dataset: &Dataset) -> Option<FilterSpec> {
    date_bounds(dataset).map(|(from, to)| FilterSpec::date_range(from, to))
}

/// Choices offered by the filter panel for `dataset`.
#[must_use]
pub fn filter_options(dataset: &Dataset) -> FilterOptions {
    let bounds = date_bounds(dataset);

    let technologies = std::iter::once(ALL_TECHNOLOGIES)
        .chain(Technology::all().iter().map(|tech| tech.title()))
        .map(String::from)
        .collect();

    let usage: BTreeSet<String> = dataset
        .records()
        .iter()
        .filter_map(|record| record.field_text(USAGE_FIELD))
        .collect();
    let usage_states = std::iter::once(ALL_USAGE_STATES.to_string())
        .chain(usage)
        .collect();

    FilterOptions {
        date_from: bounds.map(|(from, _)| from),
        date_to: bounds.map(|(_, to)| to),
        technologies,
        usage_states,
    }
}
