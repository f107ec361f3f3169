use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::categories::{label_for, Dimension, TimeBucket};
use crate::error::Result;

/// Tolerance used when checking `total == casual + registered`.
const TOTAL_TOLERANCE: f64 = 1e-9;

/// One row of the bike-sharing dataset plus its derived labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// Hour of the day, `0..=23`.
    pub hour: u8,
    /// Season code, `1..=4`.
    pub season: u8,
    /// Weather situation code, `1..=4`.
    pub weather: u8,
    /// Holiday flag, `0` or `1`.
    pub holiday: u8,
    /// Normalised temperature.
    pub temperature: f64,
    /// Normalised windspeed.
    pub windspeed: f64,
    /// Rentals by casual (unregistered) users.
    pub casual: f64,
    /// Rentals by registered users.
    pub registered: f64,
    /// Total rentals; expected to equal `casual + registered`.
    pub total: f64,
    /// Time-of-day bucket derived from `hour` at load time.
    pub time_bucket: TimeBucket,
    /// Mean-shift cluster label, `None` until clustering has run.
    #[serde(default)]
    pub cluster: Option<usize>,
}

impl Observation {
    /// Calendar month, `1..=12`.
    pub fn month(&self) -> u8 {
        self.date.month() as u8
    }

    /// The raw code of this observation along `dimension`.
    pub fn code(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Season => self.season,
            Dimension::Weather => self.weather,
            Dimension::Holiday => self.holiday,
            Dimension::Month => self.month(),
            Dimension::TimeBucket => self.time_bucket.code(),
        }
    }

    /// The display label of this observation along `dimension`.
    pub fn label(&self, dimension: Dimension) -> Result<&'static str> {
        label_for(dimension, self.code(dimension))
    }

    /// Whether `total == casual + registered` (within float tolerance).
    pub fn total_is_consistent(&self) -> bool {
        (self.casual + self.registered - self.total).abs() <= TOTAL_TOLERANCE
    }
}

/// A numeric column that can be summed or averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Total,
    Casual,
    Registered,
    Temperature,
    Windspeed,
}

impl Measure {
    /// Extract this measure from `obs`.
    pub fn value(self, obs: &Observation) -> f64 {
        match self {
            Measure::Total => obs.total,
            Measure::Casual => obs.casual,
            Measure::Registered => obs.registered,
            Measure::Temperature => obs.temperature,
            Measure::Windspeed => obs.windspeed,
        }
    }

    /// Canonical column name of the measure.
    pub fn column(self) -> &'static str {
        match self {
            Measure::Total => "cnt",
            Measure::Casual => "casual",
            Measure::Registered => "registered",
            Measure::Temperature => "temp",
            Measure::Windspeed => "windspeed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2011, 7, 4).unwrap(),
            hour: 14,
            season: 3,
            weather: 1,
            holiday: 1,
            temperature: 0.74,
            windspeed: 0.19,
            casual: 120.0,
            registered: 180.0,
            total: 300.0,
            time_bucket: TimeBucket::Afternoon,
            cluster: None,
        }
    }

    #[test]
    fn test_month_derived_from_date() {
        assert_eq!(sample().month(), 7);
        assert_eq!(sample().label(Dimension::Month).unwrap(), "Jul");
    }

    #[test]
    fn test_codes_and_labels_per_dimension() {
        let obs = sample();
        assert_eq!(obs.code(Dimension::Season), 3);
        assert_eq!(obs.label(Dimension::Season).unwrap(), "Fall");
        assert_eq!(obs.label(Dimension::Weather).unwrap(), "Clear");
        assert_eq!(obs.label(Dimension::Holiday).unwrap(), "Holiday");
        assert_eq!(obs.code(Dimension::TimeBucket), 2);
        assert_eq!(obs.label(Dimension::TimeBucket).unwrap(), "Afternoon");
    }

    #[test]
    fn test_label_for_unmapped_code_fails() {
        let obs = Observation {
            weather: 7,
            ..sample()
        };
        assert!(obs.label(Dimension::Weather).is_err());
    }

    #[test]
    fn test_total_consistency() {
        assert!(sample().total_is_consistent());
        let broken = Observation {
            total: 301.0,
            ..sample()
        };
        assert!(!broken.total_is_consistent());
    }

    #[test]
    fn test_measure_values() {
        let obs = sample();
        assert_eq!(Measure::Total.value(&obs), 300.0);
        assert_eq!(Measure::Casual.value(&obs), 120.0);
        assert_eq!(Measure::Registered.value(&obs), 180.0);
        assert!((Measure::Temperature.value(&obs) - 0.74).abs() < 1e-12);
        assert!((Measure::Windspeed.value(&obs) - 0.19).abs() < 1e-12);
        assert_eq!(Measure::Total.column(), "cnt");
    }
}
