//! Positional-column parsers for the GHCN-Daily station directory and
//! inventory files.
//!
//! Both files are plain text with one record per line and every field at a
//! fixed byte offset. Lines that are too short to hold every column are
//! skipped rather than reported.

use std::ops::Range;

use crate::domain::{Coverage, Element, Station};

/// Minimum length of a usable `ghcnd-stations.txt` line.
pub const STATION_LINE_MIN_LEN: usize = 71;

/// Minimum length of a usable `ghcnd-inventory.txt` line.
pub const INVENTORY_LINE_MIN_LEN: usize = 45;

const STATION_ID: Range<usize> = 0..11;
const STATION_LATITUDE: Range<usize> = 12..20;
const STATION_LONGITUDE: Range<usize> = 21..30;
const STATION_NAME: Range<usize> = 38..71;

const INVENTORY_ID: Range<usize> = 0..11;
const INVENTORY_ELEMENT: Range<usize> = 31..35;
const INVENTORY_FIRST_YEAR: Range<usize> = 36..40;
const INVENTORY_LAST_YEAR: Range<usize> = 41..45;

/// One temperature line from the inventory file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    pub station_id: String,
    pub element: Element,
    pub coverage: Coverage,
}

/// Extract a trimmed column. `None` if the range does not fall on
/// character boundaries.
fn column(line: &str, range: Range<usize>) -> Option<&str> {
    line.get(range).map(str::trim)
}

/// Parse one line of the station directory.
///
/// Malformed coordinates become `0.0` instead of rejecting the station.
pub fn parse_station_line(line: &str) -> Option<Station> {
    if line.len() < STATION_LINE_MIN_LEN {
        return None;
    }

    let id = column(line, STATION_ID)?;
    let latitude = column(line, STATION_LATITUDE)?.parse().unwrap_or(0.0);
    let longitude = column(line, STATION_LONGITUDE)?.parse().unwrap_or(0.0);
    let name = column(line, STATION_NAME)?;

    Some(Station::new(id, name, latitude, longitude))
}

/// Parse one line of the inventory file.
///
/// Returns `None` for short lines and for elements other than TMIN/TMAX.
/// Malformed years become `0`.
pub fn parse_inventory_line(line: &str) -> Option<InventoryRecord> {
    if line.len() < INVENTORY_LINE_MIN_LEN {
        return None;
    }

    let element = Element::from_code(column(line, INVENTORY_ELEMENT)?)?;
    let station_id = column(line, INVENTORY_ID)?.to_string();
    let first_year = column(line, INVENTORY_FIRST_YEAR)?.parse().unwrap_or(0);
    let last_year = column(line, INVENTORY_LAST_YEAR)?.parse().unwrap_or(0);

    Some(InventoryRecord {
        station_id,
        element,
        coverage: Coverage::new(first_year, last_year),
    })
}
