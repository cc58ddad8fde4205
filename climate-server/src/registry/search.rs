//! Geospatial station search.
//!
//! Stations are matched by great-circle distance from the query point and
//! by whether their coverage spans the requested years. The scan is linear:
//! the registry is a few hundred thousand entries and each check is cheap.

use std::fmt;

use haversine::{Location, Units};

use crate::domain::{Station, StationMatch};

use super::StationRegistry;

/// Parameters of a station search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Search radius in kilometres, inclusive.
    pub radius_km: u32,
    /// Maximum number of stations to return. `0` returns every match.
    pub limit: usize,
    /// First year the station must have data for.
    pub start_year: i32,
    /// Last year the station must have data for.
    pub end_year: i32,
}

/// Why a search came back empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// No station with coordinates lies within the radius.
    NoStationsInRadius,

    /// Stations exist within the radius, but none covers the requested years.
    NoCoverage {
        stations_in_radius: usize,
        start_year: i32,
        end_year: i32,
    },
}

impl EmptyReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            EmptyReason::NoStationsInRadius => "no_stations_in_radius",
            EmptyReason::NoCoverage { .. } => "no_data_in_range",
        }
    }
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NoStationsInRadius => {
                f.write_str("No stations found in this area. Try increasing the radius.")
            }
            EmptyReason::NoCoverage {
                stations_in_radius,
                start_year,
                end_year,
            } => write!(
                f,
                "There are {stations_in_radius} stations within the radius, but none have data \
                 for the selected time range ({start_year}-{end_year}). \
                 Try adjusting the start/end year."
            ),
        }
    }
}

/// Result of [`StationRegistry::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Matching stations, nearest first.
    pub stations: Vec<StationMatch>,

    /// Set when no station matched.
    pub empty_reason: Option<EmptyReason>,
}

/// Great-circle distance in kilometres between two `(latitude, longitude)`
/// points, using a mean Earth radius of 6371 km.
pub fn distance_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    haversine::distance(
        Location {
            latitude: from.0,
            longitude: from.1,
        },
        Location {
            latitude: to.0,
            longitude: to.1,
        },
        Units::Kilometers,
    )
}

impl StationRegistry {
    /// Stations with coordinates within `radius_km` of the point, with their
    /// distances, in registry order.
    fn within_radius(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: u32,
    ) -> impl Iterator<Item = (&Station, f64)> {
        let radius = f64::from(radius_km);
        self.stations().iter().filter_map(move |station| {
            let distance = distance_km((latitude, longitude), station.position()?);
            (distance <= radius).then_some((station, distance))
        })
    }

    /// Stations within the radius whose coverage spans the requested
    /// years, nearest first, at most `limit` of them.
    ///
    /// Stations at equal distance keep their registry order.
    pub fn find_stations(&self, query: &StationQuery) -> Vec<StationMatch> {
        let mut matches = self.matching_stations(query);
        apply_limit(&mut matches, query.limit);
        matches
    }

    /// Number of stations within the radius, regardless of coverage.
    pub fn count_in_radius(&self, latitude: f64, longitude: f64, radius_km: u32) -> usize {
        self.within_radius(latitude, longitude, radius_km).count()
    }

    /// Run a search and, when nothing matches, say why.
    pub fn search(&self, query: &StationQuery) -> SearchOutcome {
        let mut stations = self.matching_stations(query);

        let empty_reason = if stations.is_empty() {
            let in_radius = self.count_in_radius(query.latitude, query.longitude, query.radius_km);
            Some(if in_radius == 0 {
                EmptyReason::NoStationsInRadius
            } else {
                EmptyReason::NoCoverage {
                    stations_in_radius: in_radius,
                    start_year: query.start_year,
                    end_year: query.end_year,
                }
            })
        } else {
            None
        };

        apply_limit(&mut stations, query.limit);
        SearchOutcome {
            stations,
            empty_reason,
        }
    }

    /// All matches, sorted, before the limit is applied.
    fn matching_stations(&self, query: &StationQuery) -> Vec<StationMatch> {
        let mut matches: Vec<StationMatch> = self
            .within_radius(query.latitude, query.longitude, query.radius_km)
            .filter(|(station, _)| {
                self.coverage(&station.id)
                    .is_some_and(|c| c.contains(query.start_year, query.end_year))
            })
            .map(|(station, distance_km)| StationMatch {
                station: station.clone(),
                distance_km,
            })
            .collect();

        // sort_by is stable, so ties keep registry order
        matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        matches
    }
}

fn apply_limit(matches: &mut Vec<StationMatch>, limit: usize) {
    if limit > 0 {
        matches.truncate(limit);
    }
}
