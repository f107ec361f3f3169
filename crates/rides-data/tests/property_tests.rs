//! Property-based tests for the aggregation pipeline.
//!
//! ```bash
//! cargo test -p rides-data --test property_tests
//! PROPTEST_CASES=5000 cargo test -p rides-data --test property_tests
//! ```

use chrono::NaiveDate;
use proptest::prelude::*;

use rides_data::aggregator::{Aggregator, GroupKey, GroupOrder};
use rides_data::core::categories::{time_bucket_for, Dimension, TimeBucket};
use rides_data::core::models::{Measure, Observation};
use rides_data::core::summary::{MetricSummarizer, Reducer};
use rides_data::export::write_csv;
use rides_data::filter::{filter, Predicates};
use rides_data::reader::{read_observations, LoadOptions};

// =============================================================================
// Strategies
// =============================================================================

/// Observations with valid codes and whole-number counts, so sums are exact
/// regardless of summation order.
fn observation() -> impl Strategy<Value = Observation> {
    (
        (1u32..=12, 1u32..=28, 0u8..24),
        (1u8..=4, 1u8..=4, 0u8..=1),
        (0.0f64..1.0, 0.0f64..1.0),
        (0u32..400, 0u32..800),
    )
        .prop_map(
            |((month, day, hour), (season, weather, holiday), (temperature, windspeed), (casual, registered))| {
                let casual = f64::from(casual);
                let registered = f64::from(registered);
                Observation {
                    date: NaiveDate::from_ymd_opt(2011, month, day).unwrap(),
                    hour,
                    season,
                    weather,
                    holiday,
                    temperature,
                    windspeed,
                    casual,
                    registered,
                    total: casual + registered,
                    time_bucket: time_bucket_for(i64::from(hour)).unwrap(),
                    cluster: None,
                }
            },
        )
}

fn observations() -> impl Strategy<Value = Vec<Observation>> {
    prop::collection::vec(observation(), 0..60)
}

fn dimension() -> impl Strategy<Value = Dimension> {
    prop_oneof![
        Just(Dimension::Season),
        Just(Dimension::Weather),
        Just(Dimension::Holiday),
        Just(Dimension::Month),
        Just(Dimension::TimeBucket),
    ]
}

fn predicates() -> impl Strategy<Value = Predicates> {
    (
        prop::option::of(1u8..=4),
        prop::option::of(1u8..=4),
        prop::option::of(0u8..=1),
        prop::option::of(0u8..4),
    )
        .prop_map(|(season, weather, holiday, bucket)| {
            let mut preds = Predicates::new();
            if let Some(code) = season {
                preds.set(Dimension::Season, code);
            }
            if let Some(code) = weather {
                preds.set(Dimension::Weather, code);
            }
            if let Some(code) = holiday {
                preds.set(Dimension::Holiday, code);
            }
            if let Some(idx) = bucket {
                preds.set(Dimension::TimeBucket, TimeBucket::ALL[idx as usize].code());
            }
            preds
        })
}

// =============================================================================
// Aggregation Properties
// =============================================================================

mod aggregation_tests {
    use super::*;

    proptest! {
        /// Per-group sums over a full partition add up to the overall sum.
        #[test]
        fn partition_preserves_sum(records in observations(), dim in dimension()) {
            let rows = Aggregator::aggregate(
                &records,
                GroupKey::Dimension(dim),
                Measure::Total,
                Reducer::Sum,
            ).unwrap();
            let overall = MetricSummarizer::summarize(&records, Measure::Total);

            prop_assert_eq!(Aggregator::total(&rows), overall.sum);
            prop_assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), overall.count);
        }

        /// Explicit-order rows follow the order, one per present category.
        #[test]
        fn explicit_order_is_followed(records in observations(), dim in dimension()) {
            let order = dim.display_order();
            let rows = Aggregator::group_reduce(
                &records,
                |o| GroupKey::Dimension(dim).label(o),
                |o| o.total,
                Reducer::Sum,
                &GroupOrder::explicit(order.iter().copied()),
            ).unwrap();

            let present: Vec<&str> = order
                .iter()
                .copied()
                .filter(|label| records.iter().any(|o| o.label(dim).unwrap() == *label))
                .collect();
            let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
            prop_assert_eq!(labels, present);
        }

        /// The peak row's value is at least every other row's value.
        #[test]
        fn peak_is_maximal(records in observations(), dim in dimension()) {
            let rows = Aggregator::aggregate(
                &records,
                GroupKey::Dimension(dim),
                Measure::Total,
                Reducer::Mean,
            ).unwrap();
            match Aggregator::peak(&rows) {
                Some(peak) => prop_assert!(rows.iter().all(|r| r.value <= peak.value)),
                None => prop_assert!(rows.is_empty()),
            }
        }
    }
}

// =============================================================================
// Filter Properties
// =============================================================================

mod filter_tests {
    use super::*;

    proptest! {
        /// No predicates is the identity.
        #[test]
        fn empty_predicates_is_identity(records in observations()) {
            prop_assert_eq!(filter(&records, &Predicates::new()), records);
        }

        /// Filtering twice is the same as filtering once.
        #[test]
        fn filter_is_idempotent(records in observations(), preds in predicates()) {
            let once = filter(&records, &preds);
            let twice = filter(&once, &preds);
            prop_assert_eq!(once, twice);
        }

        /// Every kept record matches and nothing matching is dropped.
        #[test]
        fn filter_keeps_exactly_the_matches(records in observations(), preds in predicates()) {
            let kept = filter(&records, &preds);
            prop_assert!(kept.iter().all(|o| preds.matches(o)));
            prop_assert_eq!(kept.len(), records.iter().filter(|o| preds.matches(o)).count());
        }
    }
}

// =============================================================================
// Time Bucket & Export Properties
// =============================================================================

mod misc_tests {
    use super::*;

    proptest! {
        /// Every valid hour lands in exactly one bucket, and that bucket's
        /// range contains it.
        #[test]
        fn time_buckets_partition_the_day(hour in 0i64..24) {
            let bucket = time_bucket_for(hour).unwrap();
            prop_assert!(bucket.hours().contains(&hour));
            let owners = TimeBucket::ALL.iter().filter(|b| b.hours().contains(&hour)).count();
            prop_assert_eq!(owners, 1);
        }

        /// Hours outside the day are rejected.
        #[test]
        fn out_of_range_hours_fail(hour in prop_oneof![-1000i64..0, 24i64..1000]) {
            prop_assert!(time_bucket_for(hour).is_err());
        }

        /// Exporting then loading reproduces the records.
        #[test]
        fn export_round_trip(records in observations()) {
            let mut buf = Vec::new();
            write_csv(&records, &mut buf).unwrap();
            let loaded = read_observations(buf.as_slice(), LoadOptions { validate_totals: true }).unwrap();
            prop_assert_eq!(loaded, records);
        }
    }
}
