//! Map markers for the filtered dataset.

use mesa_agua_analytics_models::{MapMarker, MapView};
use mesa_agua_source_models::{CanonicalRecord, Coordinates, NOT_RECORDED, USAGE_FIELD};
use mesa_agua_water_point_models::Technology;

use crate::filter::FilteredDataset;

/// Field describing the source when the technology is "other".
pub const OTHER_SOURCE_DETAIL_FIELD: &str = "Detalle_otras_fuentes_de_agua";

/// Builds one marker per record plus the map centre.
#[must_use]
pub fn build_map(filtered: &FilteredDataset<'_>) -> MapView {
    let markers: Vec<MapMarker> = filtered
        .records()
        .iter()
        .copied()
        .filter_map(build_marker)
        .collect();

    MapView {
        center: center(&markers),
        markers,
    }
}

/// Marker for one record, `None` if it has no coordinates.
#[must_use]
pub fn build_marker(record: &CanonicalRecord) -> Option<MapMarker> {
    let coordinates = record.coordinates?;
    let technology = record.technology();
    let style = technology.style();

    Some(MapMarker {
        latitude: coordinates.latitude,
        longitude: coordinates.longitude,
        title: marker_title(record, technology),
        technology_key: record.technology_key.clone(),
        marker_color: style.marker_color.to_string(),
        hex: style.hex.to_string(),
        date: record
            .date_string()
            .unwrap_or_else(|| NOT_RECORDED.to_string()),
        usage: record
            .field_text(USAGE_FIELD)
            .unwrap_or_else(|| "-".to_string()),
    })
}

/// The technology title, or for records literally keyed "other", the
/// recorded description of the source when there is one.
fn marker_title(record: &CanonicalRecord, technology: Technology) -> String {
    if record
        .technology_key
        .eq_ignore_ascii_case(Technology::OTHER_KEY)
    {
        let detail = record.find_value(&[OTHER_SOURCE_DETAIL_FIELD]);
        if detail != NOT_RECORDED {
            return detail;
        }
    }
    technology.title().to_string()
}

#[allow(clippy::cast_precision_loss)]
fn center(markers: &[MapMarker]) -> Option<Coordinates> {
    if markers.is_empty() {
        return None;
    }
    let n = markers.len() as f64;
    Some(Coordinates {
        latitude: markers.iter().map(|m| m.latitude).sum::<f64>() / n,
        longitude: markers.iter().map(|m| m.longitude).sum::<f64>() / n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::apply_filter;
    use crate::test_support::{dataset, date, record, record_at};
    use mesa_agua_analytics_models::FilterSpec;
    use serde_json::json;

    fn whole_year() -> FilterSpec {
        FilterSpec::date_range(date(2024, 1, 1), date(2024, 12, 31))
    }

    #[test]
    fn marker_carries_title_date_and_usage() {
        let rec = record("AUTOMATIC_4", Some(date(2024, 5, 1)), json!({"En_uso": "si"}));
        let marker = build_marker(&rec).unwrap();
        assert_eq!(marker.title, "Pozo somero");
        assert_eq!(marker.date, "01/05/2024");
        assert_eq!(marker.usage, "si");
        assert_eq!(marker.marker_color, "green");
        assert_eq!(marker.technology_key, "AUTOMATIC_4");
    }

    #[test]
    fn unrecognized_technology_uses_other_styling() {
        let rec = record("molino", Some(date(2024, 5, 1)), json!({}));
        let marker = build_marker(&rec).unwrap();
        assert_eq!(marker.title, "Otros");
        assert_eq!(marker.hex, Technology::Otros.style().hex);
        assert_eq!(marker.usage, "-");
    }

    #[test]
    fn other_technology_shows_recorded_detail() {
        let rec = record(
            "otros",
            Some(date(2024, 5, 1)),
            json!({"Detalle_otras_fuentes_de_agua": "Aljibe comunitario"}),
        );
        assert_eq!(build_marker(&rec).unwrap().title, "Aljibe comunitario");

        let bare = record("otros", Some(date(2024, 5, 1)), json!({}));
        assert_eq!(build_marker(&bare).unwrap().title, "Otros");
    }

    #[test]
    fn map_is_centred_on_markers() {
        let data = dataset(vec![
            record_at("represa", Some(date(2024, 5, 1)), json!({}), -30.0, -64.0),
            record_at("represa", Some(date(2024, 6, 1)), json!({}), -32.0, -62.0),
        ]);
        let view = build_map(&apply_filter(&data, &whole_year()));
        assert_eq!(view.markers.len(), 2);
        let center = view.center.unwrap();
        assert!((center.latitude - -31.0).abs() < 1e-9);
        assert!((center.longitude - -63.0).abs() < 1e-9);
    }

    #[test]
    fn empty_selection_has_no_centre() {
        let data = dataset(vec![record("represa", Some(date(2023, 5, 1)), json!({}))]);
        let view = build_map(&apply_filter(&data, &whole_year()));
        assert!(view.markers.is_empty());
        assert!(view.center.is_none());
    }
}
