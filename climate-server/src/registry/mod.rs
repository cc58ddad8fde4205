//! Station registry: the station catalogue plus per-station coverage.
//!
//! The registry is built once at startup from the station directory and the
//! inventory, then shared read-only between requests behind an `Arc`, so it
//! needs no lock.

mod loader;
mod search;

use tracing::info;

use crate::domain::{Coverage, Station};
use crate::noaa::{FeedError, NoaaClient};

pub use loader::{CoverageBuilder, CoverageIndex, StationListBuilder, load_coverage, load_stations};
pub use search::{EmptyReason, SearchOutcome, StationQuery, distance_km};

/// All known stations and the years each one has temperature data for.
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    stations: Vec<Station>,
    coverage: CoverageIndex,
}

impl StationRegistry {
    /// Create a registry from already parsed parts.
    pub fn new(stations: Vec<Station>, coverage: CoverageIndex) -> Self {
        Self { stations, coverage }
    }

    /// Download both feeds and build the registry.
    ///
    /// Either feed failing fails the whole load: a search without coverage
    /// data would be meaningless.
    pub async fn load(client: &NoaaClient) -> Result<Self, FeedError> {
        let (stations, coverage) =
            tokio::try_join!(load_stations(client), load_coverage(client))?;

        info!(
            stations = stations.len(),
            coverage = coverage.len(),
            "station registry loaded"
        );

        Ok(Self::new(stations, coverage))
    }

    /// Replace the whole registry with freshly downloaded feeds.
    ///
    /// On failure the current contents are kept.
    pub async fn reload(&mut self, client: &NoaaClient) -> Result<(), FeedError> {
        *self = Self::load(client).await?;
        Ok(())
    }

    /// Build a registry from the text of both feeds.
    pub fn from_feeds(stations_text: &str, inventory_text: &str) -> Self {
        let mut stations = StationListBuilder::new();
        stations_text.lines().for_each(|line| stations.push_line(line));

        let mut coverage = CoverageBuilder::new();
        inventory_text.lines().for_each(|line| coverage.push_line(line));

        Self::new(stations.finish(), coverage.finish())
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Coverage of a station, if the inventory lists temperature data for it.
    pub fn coverage(&self, station_id: &str) -> Option<Coverage> {
        self.coverage.get(station_id).copied()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
