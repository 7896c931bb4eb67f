//! Pairwise comparison inside one pair group

use crate::output::ComparisonOutput;
use pairsim_core::{Counters, PairGroup, Record, RecordLayout, Result};
use pairsim_similarity::{DistanceEngine, PairDistance, Score};
use std::sync::Arc;
use tracing::debug;

/// Evaluates every record pair of a group against the distance engine
///
/// Self-pair groups (both halves of the key are the same bucket) hold one
/// set of records and compare each unordered pair once. Cross-bucket groups
/// hold two sets split by side flag and compare their cross product.
#[derive(Debug, Clone)]
pub struct PairwiseComparator {
    engine: Arc<DistanceEngine>,
    layout: RecordLayout,
    dist_threshold: Score,
    /// Set prefix length when inter-set matching is on
    inter_set: Option<usize>,
}

impl PairwiseComparator {
    pub fn new(
        engine: Arc<DistanceEngine>,
        dist_threshold: Score,
        inter_set: Option<usize>,
    ) -> Self {
        let layout = engine.layout();
        Self {
            engine,
            layout,
            dist_threshold,
            inter_set,
        }
    }

    pub fn engine(&self) -> &Arc<DistanceEngine> {
        &self.engine
    }

    pub fn dist_threshold(&self) -> Score {
        self.dist_threshold
    }

    /// Compare all pairs of a group, returning those within the threshold
    pub fn compare_group(
        &self,
        group: &PairGroup,
        counters: &mut Counters,
    ) -> Result<Vec<ComparisonOutput>> {
        let mut outputs = Vec::new();

        if group.key.is_self_pair() {
            let members: Vec<&Arc<Record>> =
                group.members.iter().map(|(_, record)| record).collect();
            for (i, first) in members.iter().enumerate() {
                for second in &members[i + 1..] {
                    self.compare(first, second, counters, &mut outputs)?;
                }
            }
        } else {
            let (larger, smaller) = group.sides();
            for first in &larger {
                for second in &smaller {
                    self.compare(first, second, counters, &mut outputs)?;
                }
            }
        }

        debug!(
            key = %group.key,
            members = group.len(),
            emitted = outputs.len(),
            "group compared"
        );
        Ok(outputs)
    }

    fn compare(
        &self,
        first: &Record,
        second: &Record,
        counters: &mut Counters,
        outputs: &mut Vec<ComparisonOutput>,
    ) -> Result<()> {
        let first_id = self.layout.id(first)?;
        let second_id = self.layout.id(second)?;

        if first_id == second_id {
            counters.same_id_pairs += 1;
            debug!(id = first_id, "same identity pair skipped");
            return Ok(());
        }
        counters.pairs_evaluated += 1;

        if let Some(prefix) = self.inter_set {
            if !is_inter_set_match(first_id, second_id, prefix) {
                counters.inter_set_mismatches += 1;
                return Ok(());
            }
        }

        // Rejections never reach the threshold test, so they stay out of the
        // output even when the threshold is `Score::MAX`.
        let score = match self.engine.distance(first, second, counters)? {
            PairDistance::Scored(score) => score,
            PairDistance::Vetoed { .. } => return Ok(()),
        };

        if score <= self.dist_threshold {
            counters.pairs_emitted += 1;
            let output = ComparisonOutput::new(first_id, second_id, score);
            let output = match self.engine.passive_ordinals(first.len()) {
                [] => output,
                passive => output.with_passive(
                    passive_values(first, passive)?,
                    passive_values(second, passive)?,
                ),
            };
            outputs.push(output);
        }
        Ok(())
    }
}

/// Ids carry a fixed-length set prefix; a valid pair shares the entity
/// suffix and comes from two different sets
fn is_inter_set_match(first_id: &str, second_id: &str, prefix: usize) -> bool {
    match (
        first_id.get(..prefix),
        first_id.get(prefix..),
        second_id.get(..prefix),
        second_id.get(prefix..),
    ) {
        (Some(first_set), Some(first_entity), Some(second_set), Some(second_entity)) => {
            first_entity == second_entity && first_set != second_set
        }
        _ => false,
    }
}

fn passive_values(record: &Record, ordinals: &[usize]) -> Result<Vec<String>> {
    ordinals
        .iter()
        .map(|&ordinal| record.field(ordinal).map(str::to_string))
        .collect()
}
