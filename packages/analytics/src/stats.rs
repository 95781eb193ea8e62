//! Frequency distributions for the summary dashboard.

use std::collections::BTreeMap;

use mesa_agua_analytics_models::{CategoryCount, DashboardStats};
use mesa_agua_source_models::{CanonicalRecord, USAGE_FIELD};
use mesa_agua_water_point_models::{Category, translate};

use crate::filter::FilteredDataset;

/// Work condition answer.
pub const CONDITION_FIELD: &str = "Estado_de_la_obra";
/// Water quality answer.
pub const QUALITY_FIELD: &str = "Calidad_del_agua";
/// Origin of technical assistance.
pub const ASSISTANCE_FIELD: &str = "Asistencia_t_cnica_de_la_obra";
/// Kind of user served.
pub const USER_FIELD: &str = "Usuario";
/// Problems behind non-use.
pub const PROBLEM_FIELD: &str = "Problemas_asociados_al_No_uso";

/// Whether the usage answer reports the water point as not in use.
///
/// Substring match on "no", ignoring case: "No", "NO usa" and also
/// "Notable" qualify.
#[must_use]
pub fn reports_not_in_use(record: &CanonicalRecord) -> bool {
    record
        .field_text(USAGE_FIELD)
        .is_some_and(|usage| usage.to_lowercase().contains("no"))
}

/// Computes every dashboard distribution over `filtered`.
#[must_use]
pub fn dashboard_stats(filtered: &FilteredDataset<'_>) -> DashboardStats {
    let records = filtered.records();

    let not_in_use: Vec<&CanonicalRecord> = records
        .iter()
        .copied()
        .filter(|record| reports_not_in_use(record))
        .collect();

    let problems = count_labels(not_in_use.iter().map(|record| {
        let raw = record.field_text(PROBLEM_FIELD).unwrap_or_default();
        Some(translate(raw, Category::Problem))
    }));

    DashboardStats {
        total: records.len() as u64,
        technologies: count_labels(
            records
                .iter()
                .map(|record| Some(record.technology().title().to_string())),
        ),
        conditions: distribution(records, CONDITION_FIELD, Category::Condition),
        qualities: distribution(records, QUALITY_FIELD, Category::Quality),
        assistance: distribution(records, ASSISTANCE_FIELD, Category::Assistance),
        users: distribution(records, USER_FIELD, Category::UserType),
        problems,
        all_in_use: not_in_use.is_empty(),
    }
}

/// Counts translated values of `field`; records without it are skipped.
fn distribution(
    records: &[&CanonicalRecord],
    field: &str,
    category: Category,
) -> Vec<CategoryCount> {
    count_labels(records.iter().map(|record| {
        record
            .field_text(field)
            .map(|raw| translate(raw, category))
    }))
}

/// Tallies labels, most frequent first and alphabetical among ties.
fn count_labels(labels: impl Iterator<Item = Option<String>>) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for label in labels.flatten() {
        *counts.entry(label).or_default() += 1;
    }

    let mut counts: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, count)| CategoryCount { label, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    counts
}
