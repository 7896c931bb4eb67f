//! Partition routing and pair-group formation
//!
//! Copies are routed by a hash of their key's base component only, and
//! grouped by key equality, so the side flag and the emission order never
//! influence which group a copy lands in.

use crate::bucket::{CanonicalPairKey, SideFlag, TaggedRecord};
use crate::record::Record;
use std::cmp::Ordering;
use std::sync::Arc;

/// All copies sharing one canonical pair key
#[derive(Debug, Clone)]
pub struct PairGroup {
    pub key: CanonicalPairKey,
    pub members: Vec<(SideFlag, Arc<Record>)>,
}

impl PairGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Split members by side flag into `(larger, smaller_or_equal)` sets
    pub fn sides(&self) -> (Vec<&Arc<Record>>, Vec<&Arc<Record>>) {
        let mut larger = Vec::new();
        let mut smaller = Vec::new();
        for (flag, record) in &self.members {
            match flag {
                SideFlag::Larger => larger.push(record),
                SideFlag::SmallerOrEqual => smaller.push(record),
            }
        }
        (larger, smaller)
    }
}

/// Routing and grouping contract over fan-out copies
#[derive(Debug, Clone, Copy)]
pub struct PairGroupRouter {
    num_partitions: usize,
}

impl PairGroupRouter {
    pub fn new(num_partitions: usize) -> Self {
        Self {
            num_partitions: num_partitions.max(1),
        }
    }

    #[inline]
    pub fn num_partitions(&self) -> usize {
        self.num_partitions
    }

    /// Partition index of a key; ignores the side flag
    #[inline]
    pub fn partition(&self, key: &CanonicalPairKey) -> usize {
        key.base_hash() as usize % self.num_partitions
    }

    /// Group comparator: copies belong together iff their keys are equal
    #[inline]
    pub fn group_cmp(a: &TaggedRecord, b: &TaggedRecord) -> Ordering {
        a.key.cmp(&b.key)
    }

    /// Distribute copies over partitions
    pub fn route<I>(&self, copies: I) -> Vec<Vec<TaggedRecord>>
    where
        I: IntoIterator<Item = TaggedRecord>,
    {
        let mut partitions: Vec<Vec<TaggedRecord>> = vec![Vec::new(); self.num_partitions];
        for copy in copies {
            let index = self.partition(&copy.key);
            partitions[index].push(copy);
        }
        partitions
    }

    /// Sort one partition's copies by key and cut them into groups
    pub fn group(&self, mut copies: Vec<TaggedRecord>) -> Vec<PairGroup> {
        copies.sort_by(Self::group_cmp);

        let mut groups: Vec<PairGroup> = Vec::new();
        for copy in copies {
            match groups.last_mut() {
                Some(group) if group.key == copy.key => {
                    group.members.push((copy.flag, copy.record));
                }
                _ => groups.push(PairGroup {
                    key: copy.key,
                    members: vec![(copy.flag, copy.record)],
                }),
            }
        }
        groups
    }
}

impl Default for PairGroupRouter {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketKeyAssigner;
    use crate::record::RecordLayout;

    fn tagged(partition: &str, a: usize, b: usize, flag: SideFlag, id: &str) -> TaggedRecord {
        TaggedRecord {
            key: CanonicalPairKey::new(partition, a, b),
            flag,
            record: Arc::new([id].into_iter().collect()),
        }
    }

    #[test]
    fn test_partition_ignores_flag() {
        let router = PairGroupRouter::new(7);
        let a = tagged("none", 4, 2, SideFlag::Larger, "x");
        let b = tagged("none", 2, 4, SideFlag::SmallerOrEqual, "y");
        assert_eq!(router.partition(&a.key), router.partition(&b.key));
    }

    #[test]
    fn test_group_ignores_flag_and_order() {
        let router = PairGroupRouter::new(1);
        let copies = vec![
            tagged("none", 1, 0, SideFlag::SmallerOrEqual, "c"),
            tagged("none", 0, 0, SideFlag::SmallerOrEqual, "a"),
            tagged("none", 1, 0, SideFlag::Larger, "b"),
            tagged("none", 0, 0, SideFlag::SmallerOrEqual, "d"),
        ];
        let groups = router.group(copies);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, CanonicalPairKey::new("none", 0, 0));
        assert_eq!(groups[0].len(), 2);

        let (larger, smaller) = groups[1].sides();
        assert_eq!(larger.len(), 1);
        assert_eq!(smaller.len(), 1);
        assert_eq!(larger[0].field(0).unwrap(), "b");
        assert_eq!(smaller[0].field(0).unwrap(), "c");
    }

    #[test]
    fn test_route_keeps_groups_whole() {
        let assigner = BucketKeyAssigner::new(8, RecordLayout::new(0, None)).unwrap();
        let router = PairGroupRouter::new(3);
        let copies: Vec<TaggedRecord> = ["a", "b", "c", "d", "e"]
            .iter()
            .flat_map(|id| {
                assigner
                    .assign(Arc::new([*id].into_iter().collect()))
                    .unwrap()
            })
            .collect();
        let total = copies.len();

        let partitions = router.route(copies);
        assert_eq!(partitions.len(), 3);
        assert_eq!(partitions.iter().map(Vec::len).sum::<usize>(), total);

        // every key is present in exactly one partition
        let mut seen = std::collections::HashMap::new();
        for (index, partition) in partitions.into_iter().enumerate() {
            for group in router.group(partition) {
                assert!(seen.insert(group.key.clone(), index).is_none());
            }
        }
    }

    #[test]
    fn test_zero_partitions_clamped() {
        assert_eq!(PairGroupRouter::new(0).num_partitions(), 1);
    }
}
