//! A single-entry cache with a fixed freshness window.
//!
//! The current time is always passed in, so expiry can be driven from
//! tests without sleeping.

use std::time::{Duration, Instant};

/// A cached value and the instant it stops being fresh.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The cached value.
    pub value: T,
    /// First instant at which the value is stale.
    pub expires_at: Instant,
}

/// Holds at most one value, fresh for `ttl` after it was stored.
#[derive(Debug, Clone)]
pub struct TimedCache<T> {
    ttl: Duration,
    entry: Option<CacheEntry<T>>,
}

impl<T> TimedCache<T> {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// Freshness window.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the value if it is still fresh at `now`.
    #[must_use]
    pub fn get(&self, now: Instant) -> Option<&T> {
        self.entry
            .as_ref()
            .filter(|entry| now < entry.expires_at)
            .map(|entry| &entry.value)
    }

    /// Replaces the cached value, fresh from `now`.
    pub fn store(&mut self, value: T, now: Instant) -> &T {
        let entry = self.entry.insert(CacheEntry {
            value,
            expires_at: now + self.ttl,
        });
        &entry.value
    }
}
