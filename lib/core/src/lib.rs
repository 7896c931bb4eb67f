//! # pairsim Core
//!
//! Core library for pairsim, the all-pairs similarity engine.
//!
//! This crate provides the partitioning side of the pairwise join:
//!
//! - [`Record`] - A delimited row addressed by field ordinal
//! - [`BucketKeyAssigner`] - Fans each record out under symmetric pair keys
//! - [`CanonicalPairKey`] - Unordered pair of bucket indices, larger first
//! - [`PairGroupRouter`] - Routes copies to partitions and cuts them into groups
//! - [`Counters`] - Mergeable monitoring counters
//!
//! ## Example
//!
//! ```rust
//! use pairsim_core::{BucketKeyAssigner, FieldSplitter, PairGroupRouter, RecordLayout};
//! use std::sync::Arc;
//!
//! let splitter = FieldSplitter::new(",").unwrap();
//! let assigner = BucketKeyAssigner::new(4, RecordLayout::new(0, None)).unwrap();
//! let router = PairGroupRouter::new(2);
//!
//! let copies: Vec<_> = ["p1,red", "p2,blue"]
//!     .iter()
//!     .flat_map(|line| assigner.assign(Arc::new(splitter.record(line))).unwrap())
//!     .collect();
//! assert_eq!(copies.len(), 8);
//!
//! let groups: Vec<_> = router
//!     .route(copies)
//!     .into_iter()
//!     .flat_map(|partition| router.group(partition))
//!     .collect();
//! assert!(!groups.is_empty());
//! ```

pub mod bucket;
pub mod counters;
pub mod error;
pub mod record;
pub mod router;

pub use bucket::{home_bucket, stable_hash, BucketKeyAssigner, CanonicalPairKey, SideFlag, TaggedRecord};
pub use counters::Counters;
pub use error::{Error, Result};
pub use record::{FieldSplitter, Record, RecordLayout, NO_PARTITION};
pub use router::{PairGroup, PairGroupRouter};
