//! Station catalogue types.

use serde::Serialize;

/// A weather station from the station directory.
///
/// Coordinates are optional: stations built from incomplete sources carry no
/// position and are never returned by geospatial search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    /// GHCN station identifier (e.g. `USW00094728`).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Latitude in decimal degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// Longitude in decimal degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Station {
    /// Create a station with known coordinates.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Both coordinates, if the station has a position.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Years for which a station has recorded temperature data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    pub first_year: i32,
    pub last_year: i32,
}

impl Coverage {
    pub fn new(first_year: i32, last_year: i32) -> Self {
        Self {
            first_year,
            last_year,
        }
    }

    /// Widen this span so it also covers `other`.
    pub fn merge(&mut self, other: Coverage) {
        self.first_year = self.first_year.min(other.first_year);
        self.last_year = self.last_year.max(other.last_year);
    }

    /// Whether `[start_year, end_year]` lies entirely inside this span.
    pub fn contains(&self, start_year: i32, end_year: i32) -> bool {
        self.first_year <= start_year && self.last_year >= end_year
    }
}

/// A station returned by a geospatial search, with its distance from the
/// query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMatch {
    #[serde(flatten)]
    pub station: Station,

    /// Great-circle distance from the query point in kilometres.
    #[serde(rename = "distance")]
    pub distance_km: f64,
}
