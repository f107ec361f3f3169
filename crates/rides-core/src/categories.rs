//! Fixed code → label mappings for every categorical dimension of the
//! dataset, plus the hour-of-day → time-of-day partition.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RidesError};

// ── Label tables ──────────────────────────────────────────────────────────────

const SEASON_LABELS: &[(u8, &str)] = &[(1, "Spring"), (2, "Summer"), (3, "Fall"), (4, "Winter")];

const WEATHER_LABELS: &[(u8, &str)] = &[
    (1, "Clear"),
    (2, "Mist"),
    (3, "Light Rain"),
    (4, "Heavy Rain"),
];

const HOLIDAY_LABELS: &[(u8, &str)] = &[(0, "Non-Holiday"), (1, "Holiday")];

const MONTH_LABELS: &[(u8, &str)] = &[
    (1, "Jan"),
    (2, "Feb"),
    (3, "Mar"),
    (4, "Apr"),
    (5, "May"),
    (6, "Jun"),
    (7, "Jul"),
    (8, "Aug"),
    (9, "Sep"),
    (10, "Oct"),
    (11, "Nov"),
    (12, "Dec"),
];

const TIME_BUCKET_LABELS: &[(u8, &str)] = &[
    (0, "Night"),
    (1, "Morning"),
    (2, "Afternoon"),
    (3, "Evening"),
];

/// Half-open hour ranges, night first. Together they cover `0..24` exactly once.
const TIME_BUCKET_RANGES: [(Range<i64>, TimeBucket); 4] = [
    (0..6, TimeBucket::Night),
    (6..12, TimeBucket::Morning),
    (12..18, TimeBucket::Afternoon),
    (18..24, TimeBucket::Evening),
];

// ── Dimension ─────────────────────────────────────────────────────────────────

/// A named categorical axis of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Season,
    Weather,
    Holiday,
    /// Calendar month, derived from the observation date.
    Month,
    /// Time-of-day bucket, derived from the hour.
    TimeBucket,
}

impl Dimension {
    /// Lower-case name used in error messages and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            Dimension::Season => "season",
            Dimension::Weather => "weather",
            Dimension::Holiday => "holiday",
            Dimension::Month => "month",
            Dimension::TimeBucket => "time bucket",
        }
    }

    fn table(self) -> &'static [(u8, &'static str)] {
        match self {
            Dimension::Season => SEASON_LABELS,
            Dimension::Weather => WEATHER_LABELS,
            Dimension::Holiday => HOLIDAY_LABELS,
            Dimension::Month => MONTH_LABELS,
            Dimension::TimeBucket => TIME_BUCKET_LABELS,
        }
    }

    /// Every label of the dimension in display order.
    pub fn display_order(self) -> Vec<&'static str> {
        self.table().iter().map(|(_, label)| *label).collect()
    }

    /// Every valid code of the dimension in display order.
    pub fn codes(self) -> Vec<u8> {
        self.table().iter().map(|(code, _)| *code).collect()
    }
}

/// Resolve `code` to its display label within `dimension`.
///
/// Fails with [`RidesError::UnknownCode`] for codes outside the fixed mapping.
pub fn label_for(dimension: Dimension, code: u8) -> Result<&'static str> {
    dimension
        .table()
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .ok_or(RidesError::UnknownCode {
            dimension: dimension.name(),
            code: i64::from(code),
        })
}

// ── TimeBucket ────────────────────────────────────────────────────────────────

/// Coarse time-of-day category derived from the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimeBucket {
    /// All buckets in display order.
    pub const ALL: [TimeBucket; 4] = [
        TimeBucket::Night,
        TimeBucket::Morning,
        TimeBucket::Afternoon,
        TimeBucket::Evening,
    ];

    /// Numeric code used by the filter engine (0 = night … 3 = evening).
    pub fn code(self) -> u8 {
        match self {
            TimeBucket::Night => 0,
            TimeBucket::Morning => 1,
            TimeBucket::Afternoon => 2,
            TimeBucket::Evening => 3,
        }
    }

    /// Display label, e.g. `"Afternoon"`.
    pub fn label(self) -> &'static str {
        TIME_BUCKET_LABELS[self.code() as usize].1
    }

    /// The hour range this bucket covers.
    pub fn hours(self) -> Range<i64> {
        TIME_BUCKET_RANGES[self.code() as usize].0.clone()
    }

    /// Parse a case-insensitive bucket name such as `"morning"`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.label().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Map an hour of the day onto its [`TimeBucket`].
///
/// Fails with [`RidesError::HourOutOfRange`] outside `0..=23`.
pub fn time_bucket_for(hour: i64) -> Result<TimeBucket> {
    TIME_BUCKET_RANGES
        .iter()
        .find(|(range, _)| range.contains(&hour))
        .map(|(_, bucket)| *bucket)
        .ok_or(RidesError::HourOutOfRange(hour))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
