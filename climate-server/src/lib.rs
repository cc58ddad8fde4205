//! Climate station server.
//!
//! Finds GHCN-Daily weather stations near a point that have temperature data
//! for a range of years, and summarises a station's daily minimum and
//! maximum temperatures into yearly and seasonal averages.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod domain;
pub mod noaa;
pub mod registry;
pub mod web;

#[cfg(test)]
mod test_support;
