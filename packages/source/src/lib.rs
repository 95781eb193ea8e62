#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Survey form fetching, time-boxed caching and record normalization.
//!
//! The [`SubmissionApi`] trait abstracts how raw submissions are
//! retrieved; [`client::FormApiClient`] is the HTTP implementation.
//! [`fetcher::DataFetcher`] ties an API to the normalizer and to a
//! [`cache::TimedCache`] so repeated reads within the freshness window
//! never hit the network.

pub mod cache;
pub mod client;
pub mod fetcher;
pub mod form_def;
pub mod normalize;
pub mod parsing;

use async_trait::async_trait;

/// Errors that can occur while fetching or normalizing submissions.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Missing or invalid configuration (e.g. no API token).
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what is missing.
        message: String,
    },

    /// Data normalization error.
    #[error("Normalization error: {message}")]
    Normalization {
        /// Description of what went wrong.
        message: String,
    },
}

/// Source of raw survey submissions.
#[async_trait]
pub trait SubmissionApi: Send + Sync {
    /// Retrieves every raw submission of the form.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request, authentication, or
    /// response parsing fails.
    async fn fetch_submissions(&self) -> Result<Vec<serde_json::Value>, SourceError>;
}
