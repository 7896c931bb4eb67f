//! # pairsim Join
//!
//! Drives the pairwise join: compares the records of every pair group,
//! filters by the output threshold and runs the whole pipeline in process.
//!
//! ## Example
//!
//! ```rust
//! use pairsim_join::{JobConfig, LocalRunner};
//! use pairsim_similarity::{FieldSpec, Schema};
//! use std::io::Cursor;
//!
//! let schema = Schema::new(
//!     0,
//!     vec![FieldSpec::categorical(1, 1.0), FieldSpec::categorical(2, 1.0)],
//! );
//! let config = JobConfig {
//!     bucket_count: 4,
//!     ..JobConfig::default()
//! };
//!
//! let runner = LocalRunner::new(schema, &config).unwrap();
//! let report = runner.run_reader(Cursor::new("A,red,small\nB,red,large\n")).unwrap();
//!
//! assert_eq!(report.outputs.len(), 1);
//! assert_eq!(report.outputs[0].id_pair(), ("A", "B"));
//! assert_eq!(report.outputs[0].score, 500);
//! ```

pub mod comparator;
pub mod config;
pub mod output;
pub mod runner;

pub use comparator::PairwiseComparator;
pub use config::JobConfig;
pub use output::{ComparisonOutput, OutputFormat, OutputWriter};
pub use runner::{CancellationToken, LocalRunner, RunReport};
