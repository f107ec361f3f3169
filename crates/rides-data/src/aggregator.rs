//! Group-by / reduce over observations.
//!
//! Every chart on the dashboard is one call into [`Aggregator`]: pick a group
//! key, a measure and a reducer, and get back one [`AggregateRow`] per
//! category present in the input, in a caller-controlled order.

use indexmap::IndexMap;
use serde::Serialize;

use rides_core::categories::Dimension;
use rides_core::models::{Measure, Observation};
use rides_core::summary::{Reducer, Summary};
use rides_core::{Result, RidesError};

// ── AggregateRow ──────────────────────────────────────────────────────────────

/// One category and its reduced value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    /// Human-readable category label, e.g. `"Summer"`.
    pub label: String,
    /// Reduced measure for the category.
    pub value: f64,
    /// Number of records that fell into the category.
    pub count: usize,
}

impl AggregateRow {
    pub fn new(label: impl Into<String>, value: f64, count: usize) -> Self {
        Self {
            label: label.into(),
            value,
            count,
        }
    }
}

// ── GroupOrder ────────────────────────────────────────────────────────────────

/// How output rows are ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOrder {
    /// Order of first appearance in the input.
    FirstSeen,
    /// Caller-supplied category sequence. Every present category must be
    /// listed; listed categories without records are omitted.
    Explicit(Vec<String>),
}

impl GroupOrder {
    pub fn explicit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GroupOrder::Explicit(labels.into_iter().map(Into::into).collect())
    }
}

// ── GroupKey ──────────────────────────────────────────────────────────────────

/// Built-in grouping keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// A categorical dimension, labelled through the fixed code mapping.
    Dimension(Dimension),
    /// The derived mean-shift cluster label.
    Cluster,
}

impl GroupKey {
    /// The group label of `obs`.
    pub fn label(self, obs: &Observation) -> Result<String> {
        match self {
            GroupKey::Dimension(dimension) => obs.label(dimension).map(str::to_string),
            GroupKey::Cluster => obs
                .cluster
                .map(cluster_label)
                .ok_or(RidesError::ClusterNotAssigned),
        }
    }

    /// Display order for this key: the dimension's fixed order, or cluster
    /// labels in numeric order.
    pub fn natural_order(self, records: &[Observation]) -> GroupOrder {
        match self {
            GroupKey::Dimension(dimension) => GroupOrder::explicit(dimension.display_order()),
            GroupKey::Cluster => {
                let mut ids: Vec<usize> = records.iter().filter_map(|o| o.cluster).collect();
                ids.sort_unstable();
                ids.dedup();
                GroupOrder::explicit(ids.into_iter().map(cluster_label))
            }
        }
    }
}

/// Display label of a cluster id.
pub fn cluster_label(id: usize) -> String {
    format!("Cluster {id}")
}

// ── Aggregator ────────────────────────────────────────────────────────────────

/// Stateless helper that groups observations and reduces a measure per group.
pub struct Aggregator;

impl Aggregator {
    /// Group `records` by `key`, reduce `measure` per group with `reducer`,
    /// and order the rows according to `order`.
    ///
    /// Fails with:
    /// * whatever `key` returns (e.g. [`RidesError::UnknownCode`]);
    /// * [`RidesError::UnknownCategory`] when `order` is explicit and a
    ///   present category is missing from it.
    pub fn group_reduce<K, M>(
        records: &[Observation],
        key: K,
        measure: M,
        reducer: Reducer,
        order: &GroupOrder,
    ) -> Result<Vec<AggregateRow>>
    where
        K: Fn(&Observation) -> Result<String>,
        M: Fn(&Observation) -> f64,
    {
        let mut groups: IndexMap<String, Summary> = IndexMap::new();
        for obs in records {
            groups.entry(key(obs)?).or_default().add(measure(obs));
        }

        let ordered: Vec<(String, Summary)> = match order {
            GroupOrder::FirstSeen => groups.into_iter().collect(),
            GroupOrder::Explicit(sequence) => {
                if let Some(stray) = groups.keys().find(|label| !sequence.contains(label)) {
                    return Err(RidesError::UnknownCategory(stray.clone()));
                }
                // swap_remove also guards against duplicates in `sequence`.
                sequence
                    .iter()
                    .filter_map(|label| groups.swap_remove_entry(label.as_str()))
                    .collect()
            }
        };

        ordered
            .into_iter()
            .map(|(label, summary)| {
                let value = reducer.apply(&summary)?;
                Ok(AggregateRow::new(label, value, summary.count))
            })
            .collect()
    }

    /// [`group_reduce`](Self::group_reduce) with a built-in key and measure,
    /// in the key's natural display order.
    pub fn aggregate(
        records: &[Observation],
        key: GroupKey,
        measure: Measure,
        reducer: Reducer,
    ) -> Result<Vec<AggregateRow>> {
        Self::group_reduce(
            records,
            |obs| key.label(obs),
            |obs| measure.value(obs),
            reducer,
            &key.natural_order(records),
        )
    }

    /// Number of records per category; `value` equals `count`.
    pub fn count_by(records: &[Observation], key: GroupKey) -> Result<Vec<AggregateRow>> {
        Self::group_reduce(
            records,
            |obs| key.label(obs),
            |_| 1.0,
            Reducer::Sum,
            &key.natural_order(records),
        )
    }

    /// The row with the largest value. Ties go to the earliest row.
    pub fn peak(rows: &[AggregateRow]) -> Option<&AggregateRow> {
        Self::peak_index(rows).map(|i| &rows[i])
    }

    /// Index of the [`peak`](Self::peak) row.
    pub fn peak_index(rows: &[AggregateRow]) -> Option<usize> {
        rows.iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, row)| match best {
                Some((_, v)) if v >= row.value => best,
                _ => Some((i, row.value)),
            })
            .map(|(i, _)| i)
    }

    /// Sum of all row values.
    pub fn total(rows: &[AggregateRow]) -> f64 {
        rows.iter().map(|r| r.value).sum()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
