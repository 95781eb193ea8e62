//! Cached, failure-tolerant dataset loading.
//!
//! [`DataFetcher`] is the single entry point consumers use to obtain the
//! canonical dataset. Every failure (network, authentication, parsing)
//! degrades to an empty dataset carrying a user-visible warning; nothing
//! here returns an error to the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};
use mesa_agua_source_models::Dataset;
use tokio::sync::Mutex;

use crate::cache::TimedCache;
use crate::client::FormApiClient;
use crate::form_def::FormDefinition;
use crate::normalize::normalize_batch;
use crate::{SourceError, SubmissionApi};

/// The outcome of one fetch cycle.
#[derive(Debug, Clone)]
pub struct FetchedDataset {
    /// Normalized records, all with coordinates.
    pub dataset: Arc<Dataset>,
    /// Wall-clock time of the fetch, also the fallback timestamp.
    pub fetched_at: NaiveDateTime,
    /// Why the dataset is empty, when the fetch failed.
    pub warning: Option<String>,
}

/// Loads and caches the canonical dataset.
///
/// The lock is held across the network call so concurrent callers inside
/// one freshness window share a single fetch. Failed fetches are cached
/// too, which keeps a broken endpoint from being hammered.
pub struct DataFetcher {
    api: Box<dyn SubmissionApi>,
    cache: Mutex<TimedCache<FetchedDataset>>,
}

impl DataFetcher {
    /// Creates a fetcher over any submission API.
    #[must_use]
    pub fn new(api: Box<dyn SubmissionApi>, ttl: Duration) -> Self {
        Self {
            api,
            cache: Mutex::new(TimedCache::new(ttl)),
        }
    }

    /// Creates a fetcher for a form served over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP client cannot be built.
    pub fn for_form(form: &FormDefinition) -> Result<Self, SourceError> {
        Ok(Self::new(
            Box::new(FormApiClient::new(form)?),
            form.cache_ttl(),
        ))
    }

    /// Returns the cached dataset, fetching a fresh one if it expired.
    pub async fn fetch_dataset(&self) -> FetchedDataset {
        self.fetch_dataset_at(Instant::now(), Local::now().naive_local())
            .await
    }

    /// Like [`Self::fetch_dataset`] with explicit clocks: `now` drives
    /// cache expiry and `wall_clock` stamps records when the form has no
    /// date column.
    pub async fn fetch_dataset_at(&self, now: Instant, wall_clock: NaiveDateTime) -> FetchedDataset {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.get(now) {
            log::debug!(
                "Serving cached dataset from {} ({} records)",
                cached.fetched_at,
                cached.dataset.len()
            );
            return cached.clone();
        }

        let fetched = self.load(wall_clock).await;
        cache.store(fetched, now).clone()
    }

    async fn load(&self, fetched_at: NaiveDateTime) -> FetchedDataset {
        match self.api.fetch_submissions().await {
            Ok(raw) => {
                let dataset = normalize_batch(&raw, fetched_at);
                log::info!(
                    "Loaded {} of {} submissions into the dataset",
                    dataset.len(),
                    raw.len()
                );
                FetchedDataset {
                    dataset: Arc::new(dataset),
                    fetched_at,
                    warning: None,
                }
            }
            Err(e) => {
                log::error!("Failed to fetch submissions: {e}");
                FetchedDataset {
                    dataset: Arc::new(Dataset::default()),
                    fetched_at,
                    warning: Some(format!("Error: {e}")),
                }
            }
        }
    }
}
