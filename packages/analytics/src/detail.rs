//! Fact sheet for a single selected water point.

use mesa_agua_analytics_models::{FactEntry, FactSheet};
use mesa_agua_source_models::{CanonicalRecord, Coordinates, TIMESTAMP_FIELD};
use mesa_agua_water_point_models::{Category, translate};

use crate::filter::FilteredDataset;

/// How close, in degrees on each axis, a click must be to a record.
pub const SELECTION_TOLERANCE: f64 = 0.001;

/// One line of the fact sheet: a label, the keywords locating the
/// answer, and the vocabulary it is translated through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactField {
    /// Line label.
    pub label: &'static str,
    /// Any of these (case-insensitive substring) locates the answer.
    pub keywords: &'static [&'static str],
    /// Vocabulary applied to the answer, if any.
    pub category: Option<Category>,
}

/// Fact sheet lines, in display order.
pub const FACT_SHEET_FIELDS: &[FactField] = &[
    FactField {
        label: "Fecha",
        keywords: &[TIMESTAMP_FIELD],
        category: None,
    },
    FactField {
        label: "Estado de Obra",
        keywords: &["Estado_de_la_obra"],
        category: Some(Category::Condition),
    },
    FactField {
        label: "Otras Fuentes",
        keywords: &["Detalle_otras_fuentes_de_agua"],
        category: None,
    },
    FactField {
        label: "Asistencia Técnica",
        keywords: &["Asistencia_t_cnica_de_la_obra"],
        category: Some(Category::Assistance),
    },
    FactField {
        label: "En Uso",
        keywords: &["En_uso"],
        category: None,
    },
    FactField {
        label: "Problemas",
        keywords: &["Problemas_asociados_al_No_uso"],
        category: Some(Category::Problem),
    },
    FactField {
        label: "Usuario",
        keywords: &["Usuario"],
        category: Some(Category::UserType),
    },
    FactField {
        label: "Familias",
        keywords: &["Cantidad_de_familias_usuarias"],
        category: None,
    },
    FactField {
        label: "Calidad Agua",
        keywords: &["Calidad_del_agua"],
        category: Some(Category::Quality),
    },
    FactField {
        label: "Tratamiento",
        keywords: &["Realiza_treatment_del_agua_a"],
        category: None,
    },
    FactField {
        label: "Cuál tratamiento",
        keywords: &["Cual"],
        category: None,
    },
];

/// First record within [`SELECTION_TOLERANCE`] of `point`.
#[must_use]
pub fn select_record<'a>(
    filtered: &FilteredDataset<'a>,
    point: Coordinates,
) -> Option<&'a CanonicalRecord> {
    filtered.records().iter().copied().find(|record| {
        record
            .coordinates
            .is_some_and(|c| c.approx_eq(point, SELECTION_TOLERANCE))
    })
}

/// Photo link: the first field whose name contains `URL` and whose value
/// is an `http` link.
#[must_use]
pub fn image_url(record: &CanonicalRecord) -> Option<String> {
    record.fields.iter().find_map(|(name, value)| {
        let url = value.as_str()?;
        (name.to_uppercase().contains("URL") && url.starts_with("http")).then(|| url.to_string())
    })
}

/// Builds the fact sheet of `record`.
#[must_use]
pub fn fact_sheet(record: &CanonicalRecord, coordinates: Coordinates) -> FactSheet {
    let entries = FACT_SHEET_FIELDS
        .iter()
        .map(|field| {
            let value = record.find_value(field.keywords);
            FactEntry {
                label: field.label.to_string(),
                value: field
                    .category
                    .map_or_else(|| value.clone(), |category| translate(&value, category)),
            }
        })
        .collect();

    FactSheet {
        title: record.technology().title().to_string(),
        image_url: image_url(record),
        coordinates,
        entries,
    }
}

/// Selects the record at `point` and builds its fact sheet.
#[must_use]
pub fn fact_sheet_at(filtered: &FilteredDataset<'_>, point: Coordinates) -> Option<FactSheet> {
    let record = select_record(filtered, point)?;
    let coordinates = record.coordinates.unwrap_or(point);
    Some(fact_sheet(record, coordinates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::apply_filter;
    use crate::test_support::{dataset, date, record, record_at};
    use mesa_agua_analytics_models::FilterSpec;
    use mesa_agua_source_models::NOT_RECORDED;
    use serde_json::json;

    fn whole_year() -> FilterSpec {
        FilterSpec::date_range(date(2024, 1, 1), date(2024, 12, 31))
    }

    fn point(latitude: f64, longitude: f64) -> Coordinates {
        Coordinates {
            latitude,
            longitude,
        }
    }

    fn entry<'a>(sheet: &'a FactSheet, label: &str) -> &'a str {
        sheet
            .entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.value.as_str())
            .unwrap()
    }

    #[test]
    fn selects_first_record_within_tolerance() {
        let data = dataset(vec![
            record_at("represa", Some(date(2024, 5, 1)), json!({"n": 1}), -31.0, -64.0),
            record_at("represa", Some(date(2024, 5, 1)), json!({"n": 2}), -31.0005, -64.0005),
        ]);
        let filtered = apply_filter(&data, &whole_year());
        let selected = select_record(&filtered, point(-31.0004, -64.0004)).unwrap();
        assert_eq!(selected.fields["n"], json!(1));
        assert!(select_record(&filtered, point(-31.01, -64.0)).is_none());
    }

    #[test]
    fn fact_sheet_translates_categorical_answers() {
        let rec = record(
            "AUTOMATIC_1",
            Some(date(2024, 5, 1)),
            json!({
                "Estado_de_la_obra": "regular",
                "Asistencia_t_cnica_de_la_obra": "instituci_n_provinciales",
                "En_uso": "no",
                "Problemas_asociados_al_No_uso": "algo raro",
                "Usuario": "com_ind",
                "Cantidad_de_familias_usuarias": 14,
                "Calidad_del_agua": "Buena ",
            }),
        );
        let sheet = fact_sheet(&rec, point(-31.5, -64.2));
        assert_eq!(sheet.title, "Pozo profundo");
        assert_eq!(sheet.entries.len(), FACT_SHEET_FIELDS.len());
        assert_eq!(entry(&sheet, "Fecha"), "01/05/2024");
        assert_eq!(entry(&sheet, "Estado de Obra"), "Regular");
        assert_eq!(entry(&sheet, "Asistencia Técnica"), "Provincia");
        assert_eq!(entry(&sheet, "En Uso"), "no");
        assert_eq!(entry(&sheet, "Problemas"), "Otras");
        assert_eq!(entry(&sheet, "Usuario"), "Comununidad indígena");
        assert_eq!(entry(&sheet, "Familias"), "14");
        assert_eq!(entry(&sheet, "Calidad Agua"), "Buena");
        assert_eq!(entry(&sheet, "Tratamiento"), NOT_RECORDED);
    }

    #[test]
    fn missing_problem_answer_reads_as_other() {
        let rec = record("represa", Some(date(2024, 5, 1)), json!({}));
        let sheet = fact_sheet(&rec, point(-31.5, -64.2));
        assert_eq!(entry(&sheet, "Problemas"), "Otras");
        assert_eq!(entry(&sheet, "Estado de Obra"), NOT_RECORDED);
    }

    #[test]
    fn finds_image_link() {
        let rec = record(
            "represa",
            Some(date(2024, 5, 1)),
            json!({
                "download_url": "/relative/path.jpg",
                "foto_URL": "https://kc.example.org/media/foto.jpg",
            }),
        );
        assert_eq!(
            image_url(&rec).as_deref(),
            Some("https://kc.example.org/media/foto.jpg")
        );
        let plain = record("represa", Some(date(2024, 5, 1)), json!({"foto": "x.jpg"}));
        assert!(image_url(&plain).is_none());
    }

    #[test]
    fn fact_sheet_at_point() {
        let data = dataset(vec![record_at(
            "represa",
            Some(date(2024, 5, 1)),
            json!({}),
            -31.0,
            -64.0,
        )]);
        let filtered = apply_filter(&data, &whole_year());
        let sheet = fact_sheet_at(&filtered, point(-31.0, -64.0)).unwrap();
        assert_eq!(sheet.title, "Represa");
        assert!(fact_sheet_at(&filtered, point(0.0, 0.0)).is_none());
    }
}
