//! Config-driven survey form definition.
//!
//! [`FormDefinition`] captures everything needed to reach a form's
//! submission endpoint. The production form is embedded at compile time
//! from `forms/mesa_agua.toml`.

use std::time::Duration;

use serde::Deserialize;

/// TOML config for the "Mesa de Agua" form, embedded at compile time.
const MESA_AGUA_TOML: &str = include_str!("../forms/mesa_agua.toml");

/// Placeholder substituted with [`FormDefinition::form_id`] in the URL.
const FORM_ID_PLACEHOLDER: &str = "{form_id}";

/// A survey form and how to fetch its submissions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormDefinition {
    /// Unique identifier (e.g., `"mesa_agua"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Asset identifier of the form on the survey server.
    pub form_id: String,
    /// Submission endpoint, with a `{form_id}` placeholder.
    pub api_url: String,
    /// Environment variable holding the API token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// How long a fetched dataset stays fresh.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Upper bound for a single request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_token_env() -> String {
    "KOBO_TOKEN".to_string()
}

const fn default_cache_ttl_secs() -> u64 {
    60
}

const fn default_timeout_secs() -> u64 {
    30
}

/// Errors loading a [`FormDefinition`].
#[derive(Debug, thiserror::Error)]
pub enum FormDefinitionError {
    /// The TOML was malformed or missing required fields.
    #[error("Invalid form definition: {0}")]
    Toml(#[from] toml::de::Error),
}

impl FormDefinition {
    /// The embedded "Mesa de Agua" form.
    ///
    /// # Errors
    ///
    /// Returns [`FormDefinitionError`] if the embedded TOML is invalid.
    pub fn mesa_agua() -> Result<Self, FormDefinitionError> {
        parse_form_toml(MESA_AGUA_TOML)
    }

    /// Submission endpoint with the form id filled in.
    #[must_use]
    pub fn data_url(&self) -> String {
        self.api_url.replace(FORM_ID_PLACEHOLDER, &self.form_id)
    }

    /// Freshness window of the fetch cache.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Parses a [`FormDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns [`FormDefinitionError`] if the TOML is malformed or missing
/// required fields.
pub fn parse_form_toml(toml_str: &str) -> Result<FormDefinition, FormDefinitionError> {
    Ok(toml::de::from_str(toml_str)?)
}
