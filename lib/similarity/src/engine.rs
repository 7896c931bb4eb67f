//! Distance engine
//!
//! Scores one record pair against the schema: fields are visited in schema
//! order, dispatched on their data type, aggregated by the schema's distance
//! strategy, and may veto the pair outright when they exceed their own
//! threshold.

use crate::distance::{categorical_distance, numeric_distance, parse_numeric_pair};
use crate::schema::{DataType, FieldSpec, MissingValuePolicy, Schema, SchemaError};
use crate::strategy::{DistanceStrategy, Score};
use crate::structured::{DefaultStructuredDistance, Event, Location, StructuredDistance, TimeWindow};
use crate::text::TextSimilarity;
use pairsim_core::{Counters, FieldSplitter, Record, RecordLayout, Result};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Default sub-field delimiter pattern for structured attributes
pub const DEFAULT_SUB_FIELD_DELIM: &str = "::";

/// Run-level settings of the engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Multiplier turning the aggregate distance into an integer score
    pub scale: Score,
    /// Pairs scoring above this are not emitted; a vetoed pair scores one more
    pub dist_threshold: Score,
    /// When set, only these ordinals take part in the distance
    pub faceted_fields: Option<Vec<usize>>,
    /// Carry non-participating attribute values into the output
    pub include_passive_fields: bool,
    /// Pattern separating the components of structured attributes
    pub sub_field_delim: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            scale: 1000,
            dist_threshold: 1000,
            faceted_fields: None,
            include_passive_fields: false,
            sub_field_delim: DEFAULT_SUB_FIELD_DELIM.to_string(),
        }
    }
}

/// Outcome of scoring one pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairDistance {
    /// Every active field was evaluated
    Scored(Score),
    /// The field with this ordinal exceeded its own threshold
    Vetoed { ordinal: usize },
}

impl PairDistance {
    /// Net score; a veto is forced one past the output threshold
    ///
    /// At `Score::MAX` there is no score past the threshold, so a veto folds
    /// to the threshold itself. Filters must match on the variant instead.
    pub fn net(self, dist_threshold: Score) -> Score {
        match self {
            PairDistance::Scored(score) => score,
            PairDistance::Vetoed { .. } => dist_threshold.saturating_add(1),
        }
    }
}

/// Schema-driven pair scorer
///
/// Holds only read-only state after construction and is shared across all
/// group workers behind an `Arc`.
#[derive(Debug)]
pub struct DistanceEngine {
    schema: Arc<Schema>,
    options: EngineOptions,
    sub_fields: FieldSplitter,
    /// Indices into `schema.fields` of the fields that take part
    active: Vec<usize>,
    /// Ordinals outside the active set; derived from configuration only, so
    /// it is computed once and assumes the facet list is fixed for the run
    passive: OnceLock<Vec<usize>>,
    text: Arc<dyn TextSimilarity>,
    structured: Arc<dyn StructuredDistance>,
}

impl DistanceEngine {
    /// Create an engine; faceted ordinals must all exist in the schema
    pub fn new(schema: Arc<Schema>, options: EngineOptions) -> Result<Self> {
        schema.validate()?;

        if let Some(facets) = &options.faceted_fields {
            if let Some(missing) = facets.iter().find(|o| schema.field(**o).is_none()) {
                return Err(SchemaError::FacetNotInSchema(*missing).into());
            }
        }

        let active = schema
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| match &options.faceted_fields {
                Some(facets) => facets.contains(&field.ordinal),
                None => true,
            })
            .map(|(index, _)| index)
            .collect();

        let sub_fields = FieldSplitter::new(&options.sub_field_delim)?;
        let text = schema.text_algorithm.build();

        Ok(Self {
            schema,
            options,
            sub_fields,
            active,
            passive: OnceLock::new(),
            text,
            structured: Arc::new(DefaultStructuredDistance),
        })
    }

    /// Replace the free-text collaborator
    pub fn with_text_similarity(mut self, text: Arc<dyn TextSimilarity>) -> Self {
        self.text = text;
        self
    }

    /// Replace the structured-attribute collaborator
    pub fn with_structured_distance(mut self, structured: Arc<dyn StructuredDistance>) -> Self {
        self.structured = structured;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn layout(&self) -> RecordLayout {
        self.schema.layout()
    }

    /// Ordinals of the fields taking part in the distance, in schema order
    pub fn active_ordinals(&self) -> Vec<usize> {
        self.active
            .iter()
            .map(|&index| self.schema.fields[index].ordinal)
            .collect()
    }

    /// Ordinals carried into the output as passive values
    ///
    /// Empty unless passive fields are enabled. Computed on first use from the
    /// record width and cached for the rest of the run; every record of an
    /// entity type is expected to have the same width.
    pub fn passive_ordinals(&self, width: usize) -> &[usize] {
        if !self.options.include_passive_fields {
            return &[];
        }
        self.passive.get_or_init(|| {
            let active = self.active_ordinals();
            (0..width).filter(|o| !active.contains(o)).collect()
        })
    }

    /// Score a pair
    ///
    /// Fails only on structural errors: a record too short for a field's
    /// ordinal. Malformed values are counted and contribute distance 0.
    pub fn distance(&self, first: &Record, second: &Record, counters: &mut Counters) -> Result<PairDistance> {
        let mut strategy = self.schema.distance_algorithm.strategy(self.options.scale);
        strategy.reset();

        for &index in &self.active {
            let field = &self.schema.fields[index];
            let a = first.field(field.ordinal)?;
            let b = second.field(field.ordinal)?;

            let distance = if a.is_empty() || b.is_empty() {
                counters.missing(field.ordinal);
                match self.schema.missing_value_policy {
                    MissingValuePolicy::Impute => 1.0,
                    MissingValuePolicy::Skip => continue,
                }
            } else {
                self.field_distance(field, a, b, counters)
            };

            if field.is_threshold_crossed(distance) {
                counters.threshold_vetoes += 1;
                debug!(ordinal = field.ordinal, distance, "field threshold crossed");
                return Ok(PairDistance::Vetoed {
                    ordinal: field.ordinal,
                });
            }

            strategy.accumulate(distance, field.weight);
        }

        Ok(PairDistance::Scored(strategy.score()))
    }

    /// Score a pair, folding a veto into a score past the output threshold
    pub fn net_distance(&self, first: &Record, second: &Record, counters: &mut Counters) -> Result<Score> {
        Ok(self
            .distance(first, second, counters)?
            .net(self.options.dist_threshold))
    }

    /// Distance between two non-empty values of one field
    pub fn field_distance(&self, field: &FieldSpec, a: &str, b: &str, counters: &mut Counters) -> f64 {
        match field.data_type {
            DataType::Categorical => categorical_distance(field, a, b),
            DataType::Integer | DataType::Real => {
                let integer = field.data_type == DataType::Integer;
                match parse_numeric_pair(a, b, &field.unit, integer) {
                    Some((x, y)) => numeric_distance(
                        x,
                        y,
                        field.numeric_range(),
                        self.schema.numeric_diff_threshold,
                    ),
                    None => self.malformed(field, counters),
                }
            }
            DataType::Text => self.text.distance(a, b),
            DataType::TimeWindow => {
                match (
                    TimeWindow::decompose(a, &self.sub_fields),
                    TimeWindow::decompose(b, &self.sub_fields),
                ) {
                    (Ok(x), Ok(y)) => self.structured.time_window(&x, &y),
                    _ => self.malformed(field, counters),
                }
            }
            DataType::Location => {
                match (
                    Location::decompose(a, &self.sub_fields),
                    Location::decompose(b, &self.sub_fields),
                ) {
                    (Ok(x), Ok(y)) => {
                        let weights = field
                            .component_weights
                            .as_deref()
                            .or(self.schema.location_component_weights.as_deref());
                        self.structured.location(&x, &y, weights)
                    }
                    _ => self.malformed(field, counters),
                }
            }
            DataType::Event => {
                match (
                    Event::decompose(a, &self.sub_fields),
                    Event::decompose(b, &self.sub_fields),
                ) {
                    (Ok(x), Ok(y)) => self.structured.event(
                        &x,
                        &y,
                        field.component_weights.as_deref(),
                        self.schema.location_component_weights.as_deref(),
                    ),
                    _ => self.malformed(field, counters),
                }
            }
        }
    }

    // Malformed values read as identical. This under-penalizes bad data but
    // matches the established scoring of existing pipelines.
    fn malformed(&self, field: &FieldSpec, counters: &mut Counters) -> f64 {
        counters.malformed(field.ordinal);
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DistanceAlgorithm;

    fn record(values: &[&str]) -> Record {
        values.iter().copied().collect()
    }

    fn engine(schema: Schema) -> DistanceEngine {
        DistanceEngine::new(Arc::new(schema), EngineOptions::default()).unwrap()
    }

    #[test]
    fn test_two_categorical_fields() {
        let schema = Schema::new(
            0,
            vec![FieldSpec::categorical(1, 1.0), FieldSpec::categorical(2, 1.0)],
        );
        let engine = engine(schema);
        let mut counters = Counters::new();

        let a = record(&["A", "red", "small"]);
        let b = record(&["B", "red", "large"]);
        assert_eq!(
            engine.distance(&a, &b, &mut counters).unwrap(),
            PairDistance::Scored(500)
        );
    }

    #[test]
    fn test_identical_records_score_zero() {
        let schema = Schema::new(
            0,
            vec![
                FieldSpec::categorical(1, 1.0),
                FieldSpec::integer(2, 1.0).with_range(0.0, 10.0),
                FieldSpec::text(3, 1.0),
            ],
        );
        let engine = engine(schema);
        let a = record(&["A", "red", "4", "soft cotton shirt"]);
        let b = record(&["B", "red", "4", "soft cotton shirt"]);
        assert_eq!(engine.net_distance(&a, &b, &mut Counters::new()).unwrap(), 0);
    }

    #[test]
    fn test_missing_value_default_policy() {
        let schema = Schema::new(
            0,
            vec![FieldSpec::categorical(1, 1.0), FieldSpec::categorical(2, 1.0)],
        );
        let engine = engine(schema);
        let mut counters = Counters::new();

        let a = record(&["A", "red", ""]);
        let b = record(&["B", "red", "large"]);
        // missing counts as 1.0: (0 + 1) / 2
        assert_eq!(engine.net_distance(&a, &b, &mut counters).unwrap(), 500);
        assert_eq!(counters.missing_values.get(&2), Some(&1));
    }

    #[test]
    fn test_missing_value_skip_policy() {
        let schema = Schema::new(
            0,
            vec![FieldSpec::categorical(1, 1.0), FieldSpec::categorical(2, 1.0)],
        )
        .with_missing_value_policy(MissingValuePolicy::Skip);
        let engine = engine(schema);
        let mut counters = Counters::new();

        let a = record(&["A", "red", ""]);
        let b = record(&["B", "red", "large"]);
        // field 2 leaves both sums: 0 / 1
        assert_eq!(engine.net_distance(&a, &b, &mut counters).unwrap(), 0);
        assert_eq!(counters.total_missing(), 1);
    }

    #[test]
    fn test_field_threshold_veto_stops_evaluation() {
        let schema = Schema::new(
            0,
            vec![
                FieldSpec::categorical(1, 1.0).with_threshold(0.5),
                FieldSpec::integer(2, 1.0),
            ],
        );
        let engine = engine(schema);
        let mut counters = Counters::new();

        // field 2 is malformed; it would be counted if it were evaluated
        let a = record(&["A", "red", "x"]);
        let b = record(&["B", "blue", "y"]);
        let result = engine.distance(&a, &b, &mut counters).unwrap();

        assert_eq!(result, PairDistance::Vetoed { ordinal: 1 });
        assert_eq!(result.net(1000), 1001);
        assert_eq!(counters.threshold_vetoes, 1);
        assert_eq!(counters.total_malformed(), 0);
    }

    #[test]
    fn test_missing_value_can_trigger_veto() {
        let schema = Schema::new(0, vec![FieldSpec::categorical(1, 1.0).with_threshold(0.9)]);
        let engine = engine(schema);
        let a = record(&["A", ""]);
        let b = record(&["B", "red"]);
        assert_eq!(
            engine.distance(&a, &b, &mut Counters::new()).unwrap(),
            PairDistance::Vetoed { ordinal: 1 }
        );
    }

    #[test]
    fn test_malformed_numeric_counts_and_contributes_zero() {
        let schema = Schema::new(
            0,
            vec![
                FieldSpec::real(1, 1.0).with_unit("kg"),
                FieldSpec::categorical(2, 1.0),
            ],
        );
        let engine = engine(schema);
        let mut counters = Counters::new();

        let a = record(&["A", "12 lb", "red"]);
        let b = record(&["B", "12 kg", "blue"]);
        assert_eq!(engine.net_distance(&a, &b, &mut counters).unwrap(), 500);
        assert_eq!(counters.malformed_values.get(&1), Some(&1));
    }

    #[test]
    fn test_numeric_unit_and_relative_threshold() {
        let schema = Schema::new(0, vec![FieldSpec::integer(1, 1.0).with_unit("kg")])
            .with_numeric_diff_threshold(0.1);
        let engine = engine(schema);
        let mut counters = Counters::new();

        let close = engine
            .net_distance(&record(&["A", "100 kg"]), &record(&["B", "95"]), &mut counters)
            .unwrap();
        let far = engine
            .net_distance(&record(&["A", "100 kg"]), &record(&["B", "50 kg"]), &mut counters)
            .unwrap();
        assert_eq!(close, 0);
        assert_eq!(far, 1000);
        assert_eq!(counters.total_malformed(), 0);
    }

    #[test]
    fn test_short_record_is_error() {
        let schema = Schema::new(0, vec![FieldSpec::categorical(3, 1.0)]);
        let engine = engine(schema);
        let a = record(&["A", "red"]);
        let b = record(&["B", "red", "x", "y"]);
        assert!(matches!(
            engine.distance(&a, &b, &mut Counters::new()),
            Err(pairsim_core::Error::InvalidOrdinal { ordinal: 3, found: 2, .. })
        ));
    }

    #[test]
    fn test_faceted_fields() {
        let schema = Schema::new(
            0,
            vec![FieldSpec::categorical(1, 1.0), FieldSpec::categorical(2, 1.0)],
        );
        let options = EngineOptions {
            faceted_fields: Some(vec![1]),
            include_passive_fields: true,
            ..EngineOptions::default()
        };
        let engine = DistanceEngine::new(Arc::new(schema), options).unwrap();
        assert_eq!(engine.active_ordinals(), vec![1]);

        let a = record(&["A", "red", "small"]);
        let b = record(&["B", "red", "large"]);
        assert_eq!(engine.net_distance(&a, &b, &mut Counters::new()).unwrap(), 0);
        assert_eq!(engine.passive_ordinals(3), &[0, 2]);
        // cached for the run
        assert_eq!(engine.passive_ordinals(5), &[0, 2]);
    }

    #[test]
    fn test_passive_disabled_is_empty() {
        let schema = Schema::new(0, vec![FieldSpec::categorical(1, 1.0)]);
        let engine = engine(schema);
        assert!(engine.passive_ordinals(4).is_empty());
    }

    #[test]
    fn test_unknown_facet_rejected() {
        let schema = Schema::new(0, vec![FieldSpec::categorical(1, 1.0)]);
        let options = EngineOptions {
            faceted_fields: Some(vec![1, 7]),
            ..EngineOptions::default()
        };
        assert!(matches!(
            DistanceEngine::new(Arc::new(schema), options),
            Err(pairsim_core::Error::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_structured_fields() {
        let schema = Schema::new(
            0,
            vec![
                FieldSpec::time_window(1, 1.0),
                FieldSpec::location(2, 1.0),
            ],
        );
        let engine = engine(schema);
        let mut counters = Counters::new();

        let a = record(&["A", "0::100", "94107::San Francisco::CA"]);
        let b = record(&["B", "0::100", "94107::San Francisco::CA"]);
        assert_eq!(engine.net_distance(&a, &b, &mut counters).unwrap(), 0);

        let c = record(&["C", "0::100::200", "94107::San Francisco::CA"]);
        assert_eq!(engine.net_distance(&a, &c, &mut counters).unwrap(), 0);
        assert_eq!(counters.malformed_values.get(&1), Some(&1));
    }

    #[test]
    fn test_time_window_at_instant_limits() {
        let engine = engine(Schema::new(0, vec![FieldSpec::time_window(1, 1.0)]));
        let mut counters = Counters::new();

        let a = record(&["A", "-9223372036854775808::0"]);
        let b = record(&["B", "0::9223372036854775807"]);
        assert_eq!(engine.net_distance(&a, &b, &mut counters).unwrap(), 1000);

        let c = record(&["C", "-9223372036854775808::9223372036854775807"]);
        assert_eq!(engine.net_distance(&a, &c, &mut counters).unwrap(), 500);
        assert_eq!(engine.net_distance(&c, &c, &mut counters).unwrap(), 0);
        assert_eq!(counters.total_malformed(), 0);
    }

    #[test]
    fn test_location_wrong_arity_is_malformed() {
        let schema = Schema::new(
            0,
            vec![FieldSpec::location(1, 1.0), FieldSpec::categorical(2, 1.0)],
        );
        let engine = engine(schema);
        let mut counters = Counters::new();

        let a = record(&["A", "94107::San Francisco", "red"]);
        let b = record(&["B", "10001::New York::NY", "red"]);
        assert_eq!(engine.net_distance(&a, &b, &mut counters).unwrap(), 0);
        assert_eq!(counters.malformed_values.get(&1), Some(&1));
        assert_eq!(counters.total_malformed(), 1);
    }

    #[test]
    fn test_event_bad_timestamp_is_malformed() {
        let schema = Schema::new(
            0,
            vec![FieldSpec::event(1, 1.0), FieldSpec::categorical(2, 1.0)],
        );
        let engine = engine(schema);
        let mut counters = Counters::new();

        let a = record(&["A", "jazz::94107::SF::CA::notatime::100", "red"]);
        let b = record(&["B", "rock::10001::NYC::NY::0::100", "blue"]);
        assert_eq!(engine.net_distance(&a, &b, &mut counters).unwrap(), 500);
        assert_eq!(counters.malformed_values.get(&1), Some(&1));
        assert_eq!(counters.malformed_values.get(&2), None);
    }

    #[derive(Debug)]
    struct AlwaysFar;

    impl TextSimilarity for AlwaysFar {
        fn distance(&self, _a: &str, _b: &str) -> f64 {
            1.0
        }
    }

    #[test]
    fn test_custom_text_similarity() {
        let schema = Schema::new(0, vec![FieldSpec::text(1, 1.0)]);
        let engine = engine(schema).with_text_similarity(Arc::new(AlwaysFar));
        let a = record(&["A", "same words"]);
        let b = record(&["B", "same words"]);
        assert_eq!(engine.net_distance(&a, &b, &mut Counters::new()).unwrap(), 1000);
    }

    #[test]
    fn test_euclidean_aggregation() {
        let schema = Schema::new(
            0,
            vec![FieldSpec::categorical(1, 1.0), FieldSpec::categorical(2, 1.0)],
        )
        .with_distance_algorithm(DistanceAlgorithm::Euclidean);
        let engine = engine(schema);
        let a = record(&["A", "red", "small"]);
        let b = record(&["B", "red", "large"]);
        // sqrt(0.5) * 1000
        assert_eq!(engine.net_distance(&a, &b, &mut Counters::new()).unwrap(), 707);
    }
}
