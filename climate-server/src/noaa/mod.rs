//! NOAA GHCN-Daily feeds.
//!
//! Three upstream files feed the server:
//! - `ghcnd-stations.txt`: fixed-width station directory
//! - `ghcnd-inventory.txt`: fixed-width element/year-range inventory
//! - `csv/by_station/{id}.csv`: daily observations for one station
//!
//! All of them are batch snapshots; nothing here is real-time.

mod client;
mod error;
pub mod fixed_width;
pub mod observations;

pub use client::{LineCounts, NoaaClient, NoaaConfig};
pub use error::FeedError;
pub use fixed_width::{InventoryRecord, parse_inventory_line, parse_station_line};
pub use observations::{IngestStats, ObservationParser, ParsedObservations, read_observations};
