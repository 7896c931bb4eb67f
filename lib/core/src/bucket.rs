//! Symmetric hash-bucket fan-out
//!
//! Every record gets a home bucket `h` in `[0, bucket_count / 2)` and is
//! emitted once for every bucket index `i` in `[0, bucket_count)`, keyed by
//! the unordered pair `{h, i}` stored larger-first. Two records with home
//! buckets `a` and `b` therefore always share the key `(max(a, b), min(a, b))`,
//! while each record is replicated exactly `bucket_count` times no matter how
//! many records there are.

use crate::record::{Record, RecordLayout};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Deterministic, non-negative string hash
///
/// 31-multiplier polynomial over UTF-16 code units with 32-bit wrapping,
/// folded to its magnitude. Stable across processes and releases so that a
/// re-executed fan-out routes every record exactly as the first attempt did.
pub fn stable_hash(value: &str) -> u32 {
    let hash = value
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)));
    hash.unsigned_abs()
}

/// Home bucket of an identity value: `hash % bucket_count / 2`
#[inline]
pub fn home_bucket(id: &str, bucket_count: usize) -> usize {
    (stable_hash(id) as usize % bucket_count) / 2
}

/// Which member of a pair key an emitted copy stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SideFlag {
    /// The record's home bucket is the larger member of the key
    Larger = 0,
    /// The record's home bucket is the smaller (or equal) member of the key
    SmallerOrEqual = 1,
}

impl SideFlag {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Unordered pair of bucket indices plus partition label
///
/// The constructor always stores the larger index first, so `new(p, a, b)`
/// and `new(p, b, a)` are the same key. The side flag is deliberately not
/// part of the key: equality, ordering and hashing see only
/// `(partition, larger, smaller)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPairKey {
    partition: Arc<str>,
    larger: u32,
    smaller: u32,
}

impl CanonicalPairKey {
    pub fn new(partition: impl Into<Arc<str>>, a: usize, b: usize) -> Self {
        let (larger, smaller) = if a >= b { (a, b) } else { (b, a) };
        Self {
            partition: partition.into(),
            larger: larger as u32,
            smaller: smaller as u32,
        }
    }

    #[inline]
    pub fn partition(&self) -> &str {
        &self.partition
    }

    #[inline]
    pub fn larger(&self) -> usize {
        self.larger as usize
    }

    #[inline]
    pub fn smaller(&self) -> usize {
        self.smaller as usize
    }

    /// Both members are the same bucket
    #[inline]
    pub fn is_self_pair(&self) -> bool {
        self.larger == self.smaller
    }

    /// Hash over the key's base component, used for partition routing
    pub fn base_hash(&self) -> u32 {
        let mut hash = stable_hash(&self.partition);
        hash = hash.wrapping_mul(31).wrapping_add(self.larger);
        hash = hash.wrapping_mul(31).wrapping_add(self.smaller);
        hash
    }
}

impl fmt::Display for CanonicalPairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:({},{})", self.partition, self.larger, self.smaller)
    }
}

/// One fan-out copy of a record
#[derive(Debug, Clone)]
pub struct TaggedRecord {
    pub key: CanonicalPairKey,
    pub flag: SideFlag,
    pub record: Arc<Record>,
}

/// Emits every record `bucket_count` times under symmetric pair keys
#[derive(Debug, Clone)]
pub struct BucketKeyAssigner {
    bucket_count: usize,
    layout: RecordLayout,
}

impl BucketKeyAssigner {
    /// `bucket_count` must be even and at least 2
    pub fn new(bucket_count: usize, layout: RecordLayout) -> Result<Self> {
        if bucket_count < 2 || bucket_count % 2 != 0 || bucket_count > u32::MAX as usize {
            return Err(Error::InvalidBucketCount(bucket_count));
        }
        Ok(Self {
            bucket_count,
            layout,
        })
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    #[inline]
    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Home bucket of a record, in `[0, bucket_count / 2)`
    pub fn home_bucket(&self, record: &Record) -> Result<usize> {
        Ok(home_bucket(self.layout.id(record)?, self.bucket_count))
    }

    /// Fan a record out into exactly `bucket_count` tagged copies
    pub fn assign(&self, record: Arc<Record>) -> Result<Vec<TaggedRecord>> {
        let home = self.home_bucket(&record)?;
        let partition: Arc<str> = Arc::from(self.layout.partition(&record)?);
        trace!(home, partition = %partition, "fanning out record");

        let copies = (0..self.bucket_count)
            .map(|i| {
                let flag = if i < home {
                    SideFlag::Larger
                } else {
                    SideFlag::SmallerOrEqual
                };
                TaggedRecord {
                    key: CanonicalPairKey::new(partition.clone(), home, i),
                    flag,
                    record: record.clone(),
                }
            })
            .collect();

        Ok(copies)
    }
}
