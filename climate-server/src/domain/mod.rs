//! Domain types for the climate station server.
//!
//! Stations and their coverage come from the station directory and
//! inventory feeds; observations come from the per-station daily feeds.

mod observation;
mod station;

pub use observation::{Element, MISSING_VALUE, RawObservation, Season};
pub use station::{Coverage, Station, StationMatch};
