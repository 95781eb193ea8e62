//! HTTP client for the survey server's submission endpoint.
//!
//! One authenticated `GET` returns the whole collection as
//! `{"count": n, "next": url|null, "results": [...]}`.

use async_trait::async_trait;
use serde_json::Value;

use crate::form_def::FormDefinition;
use crate::{SourceError, SubmissionApi};

/// Fetches submissions of one form over HTTP.
#[derive(Debug, Clone)]
pub struct FormApiClient {
    client: reqwest::Client,
    url: String,
    token_env: String,
}

impl FormApiClient {
    /// Builds a client for `form`, bounded by the form's request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(form: &FormDefinition) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(form.timeout())
            .build()?;
        Ok(Self {
            client,
            url: form.data_url(),
            token_env: form.token_env.clone(),
        })
    }

    /// Reads the API token from the configured environment variable.
    fn token(&self) -> Result<String, SourceError> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| SourceError::Config {
                message: format!("{} environment variable not set", self.token_env),
            })
    }
}

#[async_trait]
impl SubmissionApi for FormApiClient {
    async fn fetch_submissions(&self) -> Result<Vec<Value>, SourceError> {
        let token = self.token()?;

        log::info!("Fetching submissions from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::AUTHORIZATION, format!("Token {token}"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;
        let results = extract_results(body)?;
        log::info!("Downloaded {} submissions", results.len());
        Ok(results)
    }
}

/// Pulls the `results` array out of a response body.
///
/// A body without `results` is an empty collection. A non-null `next`
/// link means the server paginated the response; only the first page is
/// used.
///
/// # Errors
///
/// Returns [`SourceError::Normalization`] if the body is not an object or
/// `results` is not an array.
pub fn extract_results(body: Value) -> Result<Vec<Value>, SourceError> {
    let Value::Object(mut object) = body else {
        return Err(SourceError::Normalization {
            message: "response body is not a JSON object".to_string(),
        });
    };

    if let Some(next) = object.get("next").and_then(Value::as_str) {
        log::warn!(
            "Submission endpoint returned a paginated response, only the first page is loaded (next: {next})"
        );
    }

    match object.remove("results") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(results)) => Ok(results),
        Some(_) => Err(SourceError::Normalization {
            message: "`results` is not an array".to_string(),
        }),
    }
}
