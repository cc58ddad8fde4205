//! Time-bounded cache of per-station observations.
//!
//! Per-station CSV files are large and change at most daily, so each one is
//! fetched at most once per TTL. Entries are replaced lazily: a stale entry
//! stays in the map until the next request for that station refreshes it.
//!
//! The map sits behind a single `RwLock`. The lock is never held across the
//! upstream fetch, so two concurrent misses for the same station may both
//! fetch; the later insert wins.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::RawObservation;
use crate::noaa::{FeedError, NoaaClient};

/// Observations shared between the cache and in-flight requests.
pub type SharedObservations = Arc<Vec<RawObservation>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long an entry stays fresh.
    pub ttl: Duration,

    /// Maximum number of stations kept. `None` means unbounded; `Some(0)`
    /// keeps nothing, so every request fetches.
    pub max_entries: Option<usize>,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            max_entries: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the cache gets observations from on a miss.
pub trait ObservationSource: Send + Sync + 'static {
    fn fetch_observations(
        &self,
        station_id: &str,
    ) -> impl Future<Output = Result<Vec<RawObservation>, FeedError>> + Send;
}

impl ObservationSource for NoaaClient {
    async fn fetch_observations(
        &self,
        station_id: &str,
    ) -> Result<Vec<RawObservation>, FeedError> {
        let parsed = self.station_observations(station_id).await?;
        let stats = &parsed.stats;
        debug!(
            station_id,
            rows = stats.rows_read,
            kept = parsed.observations.len(),
            short_rows = stats.short_rows,
            bad_encoding = stats.bad_encoding,
            malformed_rows = stats.malformed_rows,
            other_elements = stats.other_elements,
            bad_dates = stats.bad_dates,
            bad_values = stats.bad_values,
            missing_values = stats.missing_values,
            "ingested station observations"
        );
        Ok(parsed.observations)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    observations: SharedObservations,
    fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.fetched_at < ttl
    }
}

/// Per-station observation cache in front of an [`ObservationSource`].
pub struct StationDataCache<S> {
    source: S,
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: TimeDelta,
    max_entries: Option<usize>,
}

impl<S: ObservationSource> StationDataCache<S> {
    pub fn new(source: S, config: &CacheConfig) -> Self {
        Self {
            source,
            entries: RwLock::new(HashMap::new()),
            ttl: TimeDelta::from_std(config.ttl).unwrap_or(TimeDelta::MAX),
            max_entries: config.max_entries,
        }
    }

    /// Observations for `station_id`, from the cache when fresh.
    ///
    /// A failed fetch leaves the cache untouched, including any stale entry.
    pub async fn get(&self, station_id: &str) -> Result<SharedObservations, FeedError> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(station_id)
                && entry.is_fresh(Utc::now(), self.ttl)
            {
                return Ok(entry.observations.clone());
            }
        }

        debug!(station_id, "observation cache miss");
        let observations = Arc::new(self.source.fetch_observations(station_id).await?);
        if self.max_entries == Some(0) {
            return Ok(observations);
        }

        let mut entries = self.entries.write().await;
        if let Some(max) = self.max_entries
            && !entries.contains_key(station_id)
            && entries.len() >= max
        {
            evict_oldest(&mut entries);
        }
        entries.insert(
            station_id.to_string(),
            CacheEntry {
                observations: observations.clone(),
                fetched_at: Utc::now(),
            },
        );

        Ok(observations)
    }

    /// Number of stations currently held, fresh or stale.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Drop every entry.
    pub async fn invalidate_all(&self) {
        self.entries.write().await.clear();
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Move an entry's fetch time into the past.
    #[cfg(test)]
    async fn backdate(&self, station_id: &str, by: TimeDelta) {
        if let Some(entry) = self.entries.write().await.get_mut(station_id) {
            entry.fetched_at -= by;
        }
    }
}

fn evict_oldest(entries: &mut HashMap<String, CacheEntry>) {
    let oldest = entries
        .iter()
        .min_by_key(|(_, entry)| entry.fetched_at)
        .map(|(id, _)| id.clone());
    if let Some(id) = oldest {
        debug!(station_id = %id, "evicting oldest cache entry");
        entries.remove(&id);
    }
}
