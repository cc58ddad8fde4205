//! Yearly and seasonal temperature averages.
//!
//! Observations are in tenths of a degree; averages are reported in degrees
//! Celsius, rounded to two decimals. A minimum or maximum average is only
//! present when at least one observation of that kind exists for the
//! period, so a year with only TMAX readings reports `tmin: null`, never 0.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Element, RawObservation, Season};

/// Average temperatures for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualSummary {
    pub year: i32,
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
}

/// Average temperatures for one season of one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalSummary {
    pub year: i32,
    pub season: Season,
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
}

/// Both summaries for a station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationDetail {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annual: Vec<AnnualSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub seasonal: Vec<SeasonalSummary>,
}

impl StationDetail {
    pub fn from_observations(observations: &[RawObservation]) -> Self {
        Self {
            annual: annual_averages(observations),
            seasonal: seasonal_averages(observations),
        }
    }
}

/// Running sums for one period.
#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    min_sum: i64,
    min_count: u32,
    max_sum: i64,
    max_count: u32,
}

impl Accumulator {
    fn add(&mut self, observation: &RawObservation) {
        if observation.is_missing() {
            return;
        }
        let value = i64::from(observation.value);
        match observation.element {
            Element::MinTemperature => {
                self.min_sum += value;
                self.min_count += 1;
            }
            Element::MaxTemperature => {
                self.max_sum += value;
                self.max_count += 1;
            }
        }
    }

    fn has_data(&self) -> bool {
        self.min_count > 0 || self.max_count > 0
    }

    fn tmin(&self) -> Option<f64> {
        mean_degrees(self.min_sum, self.min_count)
    }

    fn tmax(&self) -> Option<f64> {
        mean_degrees(self.max_sum, self.max_count)
    }
}

/// Mean of tenth-degree values in degrees, rounded to two decimals.
fn mean_degrees(sum: i64, count: u32) -> Option<f64> {
    if count == 0 {
        return None;
    }
    let mean = sum as f64 / f64::from(count) / 10.0;
    Some((mean * 100.0).round() / 100.0)
}

/// Average TMIN and TMAX per calendar year, oldest year first.
pub fn annual_averages(observations: &[RawObservation]) -> Vec<AnnualSummary> {
    let mut years: BTreeMap<i32, Accumulator> = BTreeMap::new();
    for observation in observations {
        years.entry(observation.year()).or_default().add(observation);
    }

    years
        .into_iter()
        .filter(|(_, acc)| acc.has_data())
        .map(|(year, acc)| AnnualSummary {
            year,
            tmin: acc.tmin(),
            tmax: acc.tmax(),
        })
        .collect()
}

/// Average TMIN and TMAX per season, ordered by year and then Winter,
/// Spring, Summer, Autumn.
///
/// December counts towards the winter of its own year.
pub fn seasonal_averages(observations: &[RawObservation]) -> Vec<SeasonalSummary> {
    let mut seasons: BTreeMap<(i32, Season), Accumulator> = BTreeMap::new();
    for observation in observations {
        seasons
            .entry((observation.year(), observation.season()))
            .or_default()
            .add(observation);
    }

    seasons
        .into_iter()
        .filter(|(_, acc)| acc.has_data())
        .map(|((year, season), acc)| SeasonalSummary {
            year,
            season,
            tmin: acc.tmin(),
            tmax: acc.tmax(),
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn arb_observation() -> impl Strategy<Value = RawObservation> {
        (
            1900i32..2030,
            1u32..=12,
            1u32..=28,
            prop::bool::ANY,
            prop_oneof![9 => -600i32..600, 1 => Just(crate::domain::MISSING_VALUE)],
        )
            .prop_map(|(y, m, d, is_min, value)| {
                let element = if is_min {
                    Element::MinTemperature
                } else {
                    Element::MaxTemperature
                };
                RawObservation::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), element, value)
            })
    }

    proptest! {
        #[test]
        fn annual_years_strictly_increase(data in prop::collection::vec(arb_observation(), 0..200)) {
            let result = annual_averages(&data);
            prop_assert!(result.windows(2).all(|w| w[0].year < w[1].year));
        }

        #[test]
        fn seasonal_keys_strictly_increase(data in prop::collection::vec(arb_observation(), 0..200)) {
            let result = seasonal_averages(&data);
            prop_assert!(result
                .windows(2)
                .all(|w| (w[0].year, w[0].season) < (w[1].year, w[1].season)));
        }

        #[test]
        fn averages_stay_within_observed_range(data in prop::collection::vec(arb_observation(), 1..200)) {
            // Valid values are in -600..600 tenths, so every mean lies in -60..60 degrees
            for summary in annual_averages(&data) {
                for value in [summary.tmin, summary.tmax].into_iter().flatten() {
                    prop_assert!((-60.0..=60.0).contains(&value), "{value}");
                }
            }
        }

        #[test]
        fn every_row_has_some_value(data in prop::collection::vec(arb_observation(), 0..200)) {
            for summary in annual_averages(&data) {
                prop_assert!(summary.tmin.is_some() || summary.tmax.is_some());
            }
            for summary in seasonal_averages(&data) {
                prop_assert!(summary.tmin.is_some() || summary.tmax.is_some());
            }
        }

        #[test]
        fn seasonal_years_match_annual_years(data in prop::collection::vec(arb_observation(), 0..200)) {
            let annual: std::collections::BTreeSet<i32> =
                annual_averages(&data).iter().map(|a| a.year).collect();
            let seasonal: std::collections::BTreeSet<i32> =
                seasonal_averages(&data).iter().map(|s| s.year).collect();
            prop_assert_eq!(annual, seasonal);
        }
    }
}
