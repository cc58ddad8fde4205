//! Building the station list and coverage index from the fixed-width feeds.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{Coverage, Station};
use crate::noaa::{FeedError, NoaaClient, parse_inventory_line, parse_station_line};

/// Station id → years with temperature data.
pub type CoverageIndex = HashMap<String, Coverage>;

/// Accumulates stations from `ghcnd-stations.txt` lines.
#[derive(Debug, Default)]
pub struct StationListBuilder {
    stations: Vec<Station>,
    skipped: usize,
}

impl StationListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) {
        match parse_station_line(line) {
            Some(station) => self.stations.push(station),
            None => self.skipped += 1,
        }
    }

    /// Lines that could not be used.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self) -> Vec<Station> {
        self.stations
    }
}

/// Accumulates coverage from `ghcnd-inventory.txt` lines.
///
/// A station has one inventory line per element; TMIN and TMAX lines are
/// merged into the widest span.
#[derive(Debug, Default)]
pub struct CoverageBuilder {
    coverage: CoverageIndex,
    skipped: usize,
}

impl CoverageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) {
        let Some(record) = parse_inventory_line(line) else {
            self.skipped += 1;
            return;
        };

        self.coverage
            .entry(record.station_id)
            .and_modify(|existing| existing.merge(record.coverage))
            .or_insert(record.coverage);
    }

    /// Lines that were too short or not about temperature.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self) -> CoverageIndex {
        self.coverage
    }
}

/// Stream the station directory.
pub async fn load_stations(client: &NoaaClient) -> Result<Vec<Station>, FeedError> {
    let mut builder = StationListBuilder::new();
    let counts = client
        .for_each_line(&client.stations_url(), |line| builder.push_line(line))
        .await?;
    debug!(
        lines = counts.lines,
        undecodable = counts.undecodable,
        skipped = builder.skipped(),
        "read station directory"
    );
    Ok(builder.finish())
}

/// Stream the inventory and build the coverage index.
pub async fn load_coverage(client: &NoaaClient) -> Result<CoverageIndex, FeedError> {
    let mut builder = CoverageBuilder::new();
    let counts = client
        .for_each_line(&client.inventory_url(), |line| builder.push_line(line))
        .await?;
    debug!(
        lines = counts.lines,
        undecodable = counts.undecodable,
        skipped = builder.skipped(),
        "read inventory"
    );
    Ok(builder.finish())
}
