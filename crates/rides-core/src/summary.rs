use serde::{Deserialize, Serialize};

use crate::error::{Result, RidesError};
use crate::models::{Measure, Observation};

// ── Summary ───────────────────────────────────────────────────────────────────

/// Count and sum of one measure over a set of observations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of values folded in.
    pub count: usize,
    /// Sum of the values.
    pub sum: f64,
}

impl Summary {
    /// Fold one more value into the running totals.
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    /// Arithmetic mean of the folded values.
    ///
    /// Fails with [`RidesError::EmptyGroup`] when nothing has been folded in.
    pub fn mean(&self) -> Result<f64> {
        if self.count == 0 {
            return Err(RidesError::EmptyGroup(
                "mean requested over zero records".to_string(),
            ));
        }
        Ok(self.sum / self.count as f64)
    }
}

// ── Reducer ───────────────────────────────────────────────────────────────────

/// Numeric fold applied within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Sum,
    Mean,
}

impl Reducer {
    /// Reduce a finished [`Summary`] to a single value.
    pub fn apply(self, summary: &Summary) -> Result<f64> {
        match self {
            Reducer::Sum => Ok(summary.sum),
            Reducer::Mean => summary.mean(),
        }
    }
}

// ── MetricSummarizer ──────────────────────────────────────────────────────────

/// Stateless scalar statistics over observation subsets.
pub struct MetricSummarizer;

impl MetricSummarizer {
    /// Count and sum `measure` over `records`.
    pub fn summarize(records: &[Observation], measure: Measure) -> Summary {
        Self::summarize_by(records, |obs| measure.value(obs))
    }

    /// Count and sum an arbitrary per-record value over `records`.
    pub fn summarize_by(records: &[Observation], value: impl Fn(&Observation) -> f64) -> Summary {
        let mut summary = Summary::default();
        for obs in records {
            summary.add(value(obs));
        }
        summary
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
