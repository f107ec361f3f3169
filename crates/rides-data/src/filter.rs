//! Categorical predicates over observations.

use std::collections::BTreeMap;

use rides_core::categories::{label_for, Dimension};
use rides_core::models::Observation;
use tracing::debug;

/// At most one accepted code per dimension; dimensions without an entry are
/// unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicates {
    accepted: BTreeMap<Dimension, u8>,
}

impl Predicates {
    /// No predicates: every record passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Predicates::set`].
    pub fn with(mut self, dimension: Dimension, code: u8) -> Self {
        self.set(dimension, code);
        self
    }

    /// Accept only `code` along `dimension`, replacing any earlier predicate.
    pub fn set(&mut self, dimension: Dimension, code: u8) {
        self.accepted.insert(dimension, code);
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Whether `obs` satisfies every predicate.
    pub fn matches(&self, obs: &Observation) -> bool {
        self.accepted
            .iter()
            .all(|(dimension, code)| obs.code(*dimension) == *code)
    }

    /// Human-readable form, e.g. `["season = Summer", "holiday = Holiday"]`.
    pub fn describe(&self) -> Vec<String> {
        self.accepted
            .iter()
            .map(|(dimension, code)| match label_for(*dimension, *code) {
                Ok(label) => format!("{} = {}", dimension.name(), label),
                Err(_) => format!("{} = {}", dimension.name(), code),
            })
            .collect()
    }
}

impl FromIterator<(Dimension, u8)> for Predicates {
    fn from_iter<I: IntoIterator<Item = (Dimension, u8)>>(iter: I) -> Self {
        Self {
            accepted: iter.into_iter().collect(),
        }
    }
}

/// Keep the records matching every predicate, in their original order.
///
/// An empty result is not an error.
pub fn filter(records: &[Observation], predicates: &Predicates) -> Vec<Observation> {
    if predicates.is_empty() {
        return records.to_vec();
    }
    let kept: Vec<Observation> = records
        .iter()
        .filter(|obs| predicates.matches(obs))
        .cloned()
        .collect();
    debug!(
        filters = ?predicates.describe(),
        kept = kept.len(),
        total = records.len(),
        "Applied filters"
    );
    kept
}

// ── Tests ─────────────────────────────────────────────────────────────────────
