//! # pairsim
//!
//! All-pairs similarity for records of the same entity type.
//!
//! pairsim finds, for every pair of records in a data set, how far apart the
//! two are according to a field schema, and keeps the pairs that are close
//! enough. Instead of a quadratic nested loop over one machine's memory it
//! fans every record out into a fixed number of symmetric hash buckets, so
//! that each unordered pair meets in exactly one group and every group can be
//! compared independently and in parallel.
//!
//! ## Quick Start
//!
//! ### From the Command Line
//!
//! ```bash
//! pairsim --schema schema.json --input products.csv --output pairs.csv --bucket-count 64
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use pairsim::prelude::*;
//! use std::io::Cursor;
//!
//! let schema = Schema::new(
//!     0,
//!     vec![
//!         FieldSpec::categorical(1, 1.0),
//!         FieldSpec::integer(2, 1.0).with_range(0.0, 100.0),
//!     ],
//! );
//! let config = JobConfig {
//!     bucket_count: 8,
//!     dist_threshold: Some(300),
//!     ..JobConfig::default()
//! };
//!
//! let runner = LocalRunner::new(schema, &config).unwrap();
//! let report = runner
//!     .run_reader(Cursor::new("p1,shirt,40\np2,shirt,50\np3,shoe,90\n"))
//!     .unwrap();
//!
//! // only p1/p2 are within the threshold: (0 + 0.1) / 2
//! assert_eq!(report.outputs.len(), 1);
//! assert_eq!(report.outputs[0].score, 50);
//! ```
//!
//! ## Crate Structure
//!
//! - [`pairsim-core`](https://docs.rs/pairsim-core) - Records, bucket fan-out, pair keys, routing, counters
//! - [`pairsim-similarity`](https://docs.rs/pairsim-similarity) - Schema, field distances, aggregation strategies
//! - [`pairsim-join`](https://docs.rs/pairsim-join) - Pairwise comparator, job config, local runner, output
//!
//! ## Features
//!
//! - **Bounded Replication**: Every record is copied exactly `bucket_count` times
//! - **Exact Coverage**: Each distinct pair is evaluated exactly once
//! - **Typed Fields**: Categorical, numeric, text, time window, location, event
//! - **Field Vetoes**: A single field can reject a pair outright
//! - **Inter-Set Matching**: Compare only the same entity across source sets

// Re-export core types
pub use pairsim_core::{
    home_bucket, stable_hash,
    BucketKeyAssigner, CanonicalPairKey, Counters, FieldSplitter, PairGroup, PairGroupRouter,
    Record, RecordLayout, SideFlag, TaggedRecord,
    Error, Result,
};

// Re-export similarity
pub use pairsim_similarity::{
    DataType, DistanceAlgorithm, DistanceEngine, DistanceStrategy, EngineOptions, FieldSpec,
    MissingValuePolicy, PairDistance, Schema, Score, TextAlgorithm,
};

// Re-export join
pub use pairsim_join::{
    CancellationToken, ComparisonOutput, JobConfig, LocalRunner, OutputFormat, OutputWriter,
    PairwiseComparator, RunReport,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BucketKeyAssigner, CanonicalPairKey, Counters, PairGroupRouter, Record,
        DistanceEngine, EngineOptions, FieldSpec, MissingValuePolicy, Schema,
        ComparisonOutput, JobConfig, LocalRunner, RunReport,
        Error, Result,
    };
}

/// Field-level distance functions
pub mod distance {
    pub use pairsim_similarity::distance::{
        categorical_distance, jaccard_token_distance, numeric_distance, trigram_distance,
    };
}
