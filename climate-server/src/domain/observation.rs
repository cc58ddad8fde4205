//! Daily temperature observations.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Value used by the upstream feeds to mark a missing measurement.
pub const MISSING_VALUE: i32 = -9999;

/// The temperature elements we keep from the daily feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    /// `TMIN`: daily minimum temperature.
    MinTemperature,
    /// `TMAX`: daily maximum temperature.
    MaxTemperature,
}

impl Element {
    /// Parse a GHCN element code. Returns `None` for every non-temperature code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "TMIN" => Some(Element::MinTemperature),
            "TMAX" => Some(Element::MaxTemperature),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Element::MinTemperature => "TMIN",
            Element::MaxTemperature => "TMAX",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Season of the year.
///
/// December belongs to the winter of its own calendar year, not the
/// following one, so a winter is not continuous across a year boundary.
/// Variant order is the order seasons are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Season for a calendar month (1 = January).
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One daily temperature reading, in tenths of a degree Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawObservation {
    pub date: NaiveDate,
    pub element: Element,
    pub value: i32,
}

impl RawObservation {
    pub fn new(date: NaiveDate, element: Element, value: i32) -> Self {
        Self {
            date,
            element,
            value,
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn season(&self) -> Season {
        Season::from_month(self.date.month())
    }

    /// Whether the value is the upstream "missing" marker.
    pub fn is_missing(&self) -> bool {
        self.value == MISSING_VALUE
    }
}
