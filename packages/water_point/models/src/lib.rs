#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Water-point technology taxonomy and survey category vocabularies.
//!
//! Every categorical answer in a "Mesa de Agua" survey (technology, work
//! condition, water quality, technical assistance, user type, problems
//! behind non-use) is a raw form code. This crate holds the fixed
//! code-to-label tables and the single [`translate`] entry point used by
//! the map popups, the fact sheet, and the statistics dashboard so that
//! all of them agree on the displayed label.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Label returned for any problem code missing from the problem
/// vocabulary.
pub const PROBLEM_FALLBACK: &str = "Otras";

/// Kind of water infrastructure a survey describes.
///
/// The raw form keys are not uniform: some are slugs of the option label
/// (`represa`), others are the form builder's auto-generated names
/// (`AUTOMATIC_4`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Technology {
    /// Rainwater cistern for household consumption
    CisternaDeConsumo,
    /// Cistern for productive use
    CisternaProductiva,
    /// Shallow well
    PozoSomero,
    /// Deep well
    PozoProfundo,
    /// Dam
    Represa,
    /// Distribution network
    RedDeDistribucion,
    /// Australian tank
    TanqueAustraliano,
    /// Natural depression holding water
    Madrejones,
    /// Any other source, also used for unrecognized keys
    Otros,
}

/// Display metadata for a [`Technology`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TechnologyStyle {
    /// Raw form key.
    pub key: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// Marker colour name understood by the map frontend.
    pub marker_color: &'static str,
    /// Chart colour.
    pub hex: &'static str,
}

impl Technology {
    /// The sentinel used when a record carries no technology key.
    pub const OTHER_KEY: &'static str = "otros";

    /// Returns all variants in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::CisternaDeConsumo,
            Self::CisternaProductiva,
            Self::PozoSomero,
            Self::PozoProfundo,
            Self::Represa,
            Self::RedDeDistribucion,
            Self::TanqueAustraliano,
            Self::Madrejones,
            Self::Otros,
        ]
    }

    /// Returns the raw key, title and colours for this technology.
    #[must_use]
    pub const fn style(self) -> TechnologyStyle {
        match self {
            Self::CisternaDeConsumo => TechnologyStyle {
                key: "cisterna_de_consumo",
                title: "Cisterna de consumo",
                marker_color: "blue",
                hex: "#0067A5",
            },
            Self::CisternaProductiva => TechnologyStyle {
                key: "AUTOMATIC",
                title: "Cisterna productiva",
                marker_color: "cadetblue",
                hex: "#436975",
            },
            Self::PozoSomero => TechnologyStyle {
                key: "AUTOMATIC_4",
                title: "Pozo somero",
                marker_color: "green",
                hex: "#228B22",
            },
            Self::PozoProfundo => TechnologyStyle {
                key: "AUTOMATIC_1",
                title: "Pozo profundo",
                marker_color: "darkgreen",
                hex: "#006400",
            },
            Self::Represa => TechnologyStyle {
                key: "represa",
                title: "Represa",
                marker_color: "orange",
                hex: "#FF8C00",
            },
            Self::RedDeDistribucion => TechnologyStyle {
                key: "red_de_distribuci_n",
                title: "Red de distribución",
                marker_color: "purple",
                hex: "#800080",
            },
            Self::TanqueAustraliano => TechnologyStyle {
                key: "AUTOMATIC_2",
                title: "Tanque australiano",
                marker_color: "red",
                hex: "#B22222",
            },
            Self::Madrejones => TechnologyStyle {
                key: "madrejones",
                title: "Madrejones",
                marker_color: "gray",
                hex: "#696969",
            },
            Self::Otros => TechnologyStyle {
                key: Self::OTHER_KEY,
                title: "Otros",
                marker_color: "black",
                hex: "#333333",
            },
        }
    }

    /// Raw form key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        self.style().key
    }

    /// Human-readable title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        self.style().title
    }

    /// Looks up a technology by raw key.
    ///
    /// Keys are compared after trimming and ignoring ASCII case, so the
    /// same record resolves identically whether it is displayed, filtered
    /// or passed through [`translate`].
    #[must_use]
    pub fn from_key(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::all()
            .iter()
            .copied()
            .find(|tech| tech.key().eq_ignore_ascii_case(raw))
    }

    /// Like [`Self::from_key`], but falls back to [`Self::Otros`] for
    /// missing or unrecognized keys.
    #[must_use]
    pub fn resolve(raw: Option<&str>) -> Self {
        raw.and_then(Self::from_key).unwrap_or(Self::Otros)
    }

    /// Reverse lookup from a display title to its technology.
    #[must_use]
    pub fn from_title(title: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|tech| tech.title() == title)
    }

    /// Whether `raw` is this technology's key.
    #[must_use]
    pub fn matches_key(self, raw: &str) -> bool {
        self.key().eq_ignore_ascii_case(raw.trim())
    }
}

/// The closed set of categorical vocabularies a raw value can be
/// translated through.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    /// Water-point technology
    Technology,
    /// Origin of technical assistance for the work
    Assistance,
    /// Condition of the work
    Condition,
    /// Water quality
    Quality,
    /// Kind of user served
    UserType,
    /// Problems associated with non-use
    Problem,
}

const ASSISTANCE: &[(&str, &str)] = &[
    ("ong", "ONG"),
    ("instituci_n_nacionales", "Nación"),
    ("instituci_n_provinciales", "Provincia"),
    ("propio", "Propio"),
    ("otros", "Otros"),
    ("sin_asistencia", "Sin asistencia"),
];

const CONDITION: &[(&str, &str)] = &[
    ("bueno", "Bueno"),
    ("regular", "Regular"),
    ("malo", "Malo"),
];

const QUALITY: &[(&str, &str)] = &[
    ("buena", "Buena"),
    ("regular", "Regular"),
    ("mala", "Mala"),
];

const USER_TYPE: &[(&str, &str)] = &[
    ("csalud", "Centro de salud"),
    ("com_ind", "Comununidad indígena"),
    ("escuelas", "Escuela"),
    ("prod_af", "Familia rural criolla"),
    ("furbanas", "Familia urbana"),
];

// Keys are truncated by the form builder at 30 characters.
const PROBLEM: &[(&str, &str)] = &[
    ("cantidad_calidad_del_agua", "Cantidad/Calidad del agua"),
    (
        "sistema_de_captaci_n__bomba__t",
        "Sistema de captación (bomba, techo colector, toma)",
    ),
    (
        "sistema_de_conducci_n__manguer",
        "Sistema de conducción (mangueras, cañerias)",
    ),
    (
        "sistema_de_almacenamiento__cis",
        "Sistema de almacenamiento (cisterna, tanque)",
    ),
];

impl Category {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Technology,
            Self::Assistance,
            Self::Condition,
            Self::Quality,
            Self::UserType,
            Self::Problem,
        ]
    }

    /// Looks up an already-normalized code (see [`normalize_code`]).
    #[must_use]
    pub fn lookup(self, code: &str) -> Option<&'static str> {
        let table = match self {
            Self::Technology => return Technology::from_key(code).map(Technology::title),
            Self::Assistance => ASSISTANCE,
            Self::Condition => CONDITION,
            Self::Quality => QUALITY,
            Self::UserType => USER_TYPE,
            Self::Problem => PROBLEM,
        };
        table
            .iter()
            .find(|(key, _)| *key == code)
            .map(|(_, label)| *label)
    }

    /// Returns the `(raw code, label)` pairs of this vocabulary.
    #[must_use]
    pub fn vocabulary(self) -> Vec<(&'static str, &'static str)> {
        match self {
            Self::Technology => Technology::all()
                .iter()
                .map(|tech| (tech.key(), tech.title()))
                .collect(),
            Self::Assistance => ASSISTANCE.to_vec(),
            Self::Condition => CONDITION.to_vec(),
            Self::Quality => QUALITY.to_vec(),
            Self::UserType => USER_TYPE.to_vec(),
            Self::Problem => PROBLEM.to_vec(),
        }
    }
}

/// Lowercases and trims a raw code before vocabulary lookup.
#[must_use]
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Translates a raw categorical value into its display label.
///
/// The value is stringified, lowercased and trimmed before lookup.
/// Unmatched values pass through unchanged, except in the
/// [`Category::Problem`] vocabulary where they fold into
/// [`PROBLEM_FALLBACK`]: problem answers are free-text prone while the
/// others are constrained choices.
#[must_use]
pub fn translate(raw: impl Display, category: Category) -> String {
    let raw = raw.to_string();
    match category.lookup(&normalize_code(&raw)) {
        Some(label) => label.to_string(),
        None if category == Category::Problem => PROBLEM_FALLBACK.to_string(),
        None => raw,
    }
}
