//! # pairsim Similarity
//!
//! A schema-driven distance engine for delimited records.
//!
//! This crate scores record pairs for pairsim's pairwise join. A schema lists
//! the attributes that matter, their types and weights; the engine compares
//! two records field by field and folds the results into one integer score.
//!
//! ## Features
//!
//! - **Field Schema**: Typed attributes with weights, ranges, units and veto thresholds
//! - **Type Dispatch**: Categorical, integer, real, text, time window, location, event
//! - **Missing Values**: Impute maximal distance or drop the field from the aggregate
//! - **Faceting**: Restrict scoring to a subset of fields, carry the rest as passive values
//! - **Pluggable Collaborators**: Bring your own text or structured-attribute distance
//!
//! ## Example
//!
//! ```rust
//! use pairsim_similarity::{DistanceEngine, EngineOptions, FieldSpec, PairDistance, Schema};
//! use pairsim_core::{Counters, Record};
//! use std::sync::Arc;
//!
//! let schema = Schema::new(
//!     0,
//!     vec![FieldSpec::categorical(1, 1.0), FieldSpec::categorical(2, 1.0)],
//! );
//! let engine = DistanceEngine::new(Arc::new(schema), EngineOptions::default()).unwrap();
//!
//! let a: Record = ["A", "red", "small"].into_iter().collect();
//! let b: Record = ["B", "red", "large"].into_iter().collect();
//! let mut counters = Counters::new();
//!
//! assert_eq!(engine.distance(&a, &b, &mut counters).unwrap(), PairDistance::Scored(500));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Schema    │────>│   Engine    │────>│  Strategy   │
//! │  (fields)   │     │ (dispatch)  │     │ (aggregate) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                       │         │
//!               ┌───────┘         └───────┐
//!        ┌─────────────┐           ┌─────────────┐
//!        │    Text     │           │ Structured  │
//!        │ Similarity  │           │  Distance   │
//!        └─────────────┘           └─────────────┘
//! ```

pub mod schema;
pub mod distance;
pub mod text;
pub mod structured;
pub mod strategy;
pub mod engine;

// Re-export main types for convenience
pub use schema::{
    Schema,
    FieldSpec,
    DataType,
    MissingValuePolicy,
    DistanceAlgorithm,
    TextAlgorithm,
    CategoricalDistance,
    CategoricalOverrides,
    ConceptHierarchy,
    SchemaError,
};
pub use text::{TextSimilarity, JaccardText, TrigramText, ExactText};
pub use structured::{
    TimeWindow, Location, Event, StructuredDistance, DefaultStructuredDistance, StructuredParseError,
};
pub use strategy::{DistanceStrategy, MinkowskiStrategy, Score};
pub use engine::{DistanceEngine, EngineOptions, PairDistance, DEFAULT_SUB_FIELD_DELIM};
