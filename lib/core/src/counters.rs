//! Monitoring counters
//!
//! Each parallel unit owns its own `Counters` and they are merged once the
//! stage completes, so no counter is ever shared between groups.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Candidate pairs whose two records carry the same identity
    pub same_id_pairs: u64,
    /// Inter-set matching rejections
    pub inter_set_mismatches: u64,
    /// Pairs rejected by a per-field distance threshold
    pub threshold_vetoes: u64,
    /// Pairs scored by the distance engine
    pub pairs_evaluated: u64,
    /// Pairs that passed the output threshold
    pub pairs_emitted: u64,
    /// Missing-value events keyed by field ordinal
    pub missing_values: BTreeMap<usize, u64>,
    /// Unparsable or unit-mismatched values keyed by field ordinal
    pub malformed_values: BTreeMap<usize, u64>,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn missing(&mut self, ordinal: usize) {
        *self.missing_values.entry(ordinal).or_default() += 1;
    }

    #[inline]
    pub fn malformed(&mut self, ordinal: usize) {
        *self.malformed_values.entry(ordinal).or_default() += 1;
    }

    pub fn merge(&mut self, other: Counters) {
        self.same_id_pairs += other.same_id_pairs;
        self.inter_set_mismatches += other.inter_set_mismatches;
        self.threshold_vetoes += other.threshold_vetoes;
        self.pairs_evaluated += other.pairs_evaluated;
        self.pairs_emitted += other.pairs_emitted;
        for (ordinal, count) in other.missing_values {
            *self.missing_values.entry(ordinal).or_default() += count;
        }
        for (ordinal, count) in other.malformed_values {
            *self.malformed_values.entry(ordinal).or_default() += count;
        }
    }

    pub fn total_missing(&self) -> u64 {
        self.missing_values.values().sum()
    }

    pub fn total_malformed(&self) -> u64 {
        self.malformed_values.values().sum()
    }
}
