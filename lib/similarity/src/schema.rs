//! Field schema definitions
//!
//! Defines the declarative schema for same-type entity comparison.
//! The schema specifies every attribute taking part in the distance, its
//! semantic type, weight, optional numeric range and optional per-field veto
//! threshold, plus the global missing-value policy. A schema is validated once
//! at load time and then shared read-only behind an `Arc`.

use pairsim_core::RecordLayout;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Hash map keyed with aHash
pub type FastMap<K, V> = HashMap<K, V, ahash::RandomState>;

/// Number of components in a location value (postal code, city, region)
pub const LOCATION_COMPONENTS: usize = 3;

/// Number of top-level components in an event (description, location, time window)
pub const EVENT_COMPONENTS: usize = 3;

/// Field schema for one entity type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schema {
    /// Schema version for future compatibility
    #[serde(default = "default_version")]
    pub version: u32,

    /// Ordinal of the identity attribute
    pub id_ordinal: usize,

    /// Ordinal of the partitioning attribute, if records are partitioned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_ordinal: Option<usize>,

    /// Fields in evaluation order
    pub fields: Vec<FieldSpec>,

    /// What an empty attribute value contributes
    #[serde(default)]
    pub missing_value_policy: MissingValuePolicy,

    /// Relative difference above which unranged numbers count as different
    #[serde(default)]
    pub numeric_diff_threshold: f64,

    /// How per-field distances are aggregated
    #[serde(default)]
    pub distance_algorithm: DistanceAlgorithm,

    /// Text comparison used for text fields
    #[serde(default)]
    pub text_algorithm: TextAlgorithm,

    /// Component weights for locations nested in events, and the fallback
    /// for location fields without their own weights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_component_weights: Option<Vec<f64>>,
}

fn default_version() -> u32 {
    1
}

impl Schema {
    /// Create a schema with default global settings
    pub fn new(id_ordinal: usize, fields: Vec<FieldSpec>) -> Self {
        Self {
            version: 1,
            id_ordinal,
            partition_ordinal: None,
            fields,
            missing_value_policy: MissingValuePolicy::default(),
            numeric_diff_threshold: 0.0,
            distance_algorithm: DistanceAlgorithm::default(),
            text_algorithm: TextAlgorithm::default(),
            location_component_weights: None,
        }
    }

    pub fn with_partition_ordinal(mut self, ordinal: usize) -> Self {
        self.partition_ordinal = Some(ordinal);
        self
    }

    pub fn with_missing_value_policy(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_value_policy = policy;
        self
    }

    pub fn with_numeric_diff_threshold(mut self, threshold: f64) -> Self {
        self.numeric_diff_threshold = threshold;
        self
    }

    pub fn with_distance_algorithm(mut self, algorithm: DistanceAlgorithm) -> Self {
        self.distance_algorithm = algorithm;
        self
    }

    pub fn with_text_algorithm(mut self, algorithm: TextAlgorithm) -> Self {
        self.text_algorithm = algorithm;
        self
    }

    pub fn with_location_component_weights(mut self, weights: Vec<f64>) -> Self {
        self.location_component_weights = Some(weights);
        self
    }

    /// Parse and validate a JSON schema
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let schema: Schema =
            serde_json::from_str(json).map_err(|e| SchemaError::Parse(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Read, parse and validate a JSON schema file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Validate the schema
    /// - At least one field, ordinals unique
    /// - Weights and thresholds non-negative and finite
    /// - Categorical override distances within `[0, 1]`
    /// - Component weight vectors have the arity of their data type
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.ordinal) {
                return Err(SchemaError::DuplicateOrdinal(field.ordinal));
            }
            if !(field.weight.is_finite() && field.weight >= 0.0) {
                return Err(SchemaError::NegativeWeight(field.ordinal));
            }
            if let Some(threshold) = field.dist_threshold {
                if !threshold.is_finite() || threshold < 0.0 {
                    return Err(SchemaError::InvalidThreshold(field.ordinal));
                }
            }
            if let Some(entry) = field
                .categorical_distances
                .entries()
                .iter()
                .find(|e| !(0.0..=1.0).contains(&e.distance))
            {
                return Err(SchemaError::InvalidOverrideDistance {
                    ordinal: field.ordinal,
                    this_value: entry.this_value.clone(),
                    that_value: entry.that_value.clone(),
                    distance: entry.distance,
                });
            }
            if let Some(weights) = &field.component_weights {
                let expected = match field.data_type {
                    DataType::Location => Some(LOCATION_COMPONENTS),
                    DataType::Event => Some(EVENT_COMPONENTS),
                    _ => None,
                };
                match expected {
                    Some(expected) if weights.len() != expected => {
                        return Err(SchemaError::InvalidComponentWeights {
                            ordinal: field.ordinal,
                            expected,
                            actual: weights.len(),
                        });
                    }
                    None => {
                        return Err(SchemaError::InvalidComponentWeights {
                            ordinal: field.ordinal,
                            expected: 0,
                            actual: weights.len(),
                        });
                    }
                    _ => {}
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(SchemaError::NegativeWeight(field.ordinal));
                }
            }
        }

        if let Some(weights) = &self.location_component_weights {
            if weights.len() != LOCATION_COMPONENTS {
                return Err(SchemaError::InvalidLocationWeights(weights.len()));
            }
        }

        if !self.numeric_diff_threshold.is_finite() || self.numeric_diff_threshold < 0.0 {
            return Err(SchemaError::InvalidNumericThreshold(self.numeric_diff_threshold));
        }

        if let DistanceAlgorithm::Minkowski(p) = self.distance_algorithm {
            if !p.is_finite() || p < 1.0 {
                return Err(SchemaError::InvalidExponent(p));
            }
        }

        Ok(())
    }

    /// Where identity and partition live in a record
    pub fn layout(&self) -> RecordLayout {
        RecordLayout::new(self.id_ordinal, self.partition_ordinal)
    }

    /// Get a field by ordinal
    pub fn field(&self, ordinal: usize) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.ordinal == ordinal)
    }

    /// Ordinals in evaluation order
    pub fn ordinals(&self) -> Vec<usize> {
        self.fields.iter().map(|f| f.ordinal).collect()
    }
}

/// Configuration for a single attribute
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    /// Position of the attribute in a record
    pub ordinal: usize,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: DataType,

    /// Unit suffix numeric values may carry, e.g. `"kg"`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,

    #[serde(default = "default_weight")]
    pub weight: f64,

    /// Declared numeric range; used only when `max > min`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Per-field veto: a larger distance rejects the whole pair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist_threshold: Option<f64>,

    /// Custom distances between specific categorical values
    #[serde(default, skip_serializing_if = "CategoricalOverrides::is_empty")]
    pub categorical_distances: CategoricalOverrides,

    /// Child to parent mapping for categorical values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_hierarchy: Option<ConceptHierarchy>,

    /// Weights of the sub-components of a structured attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_weights: Option<Vec<f64>>,
}

fn default_weight() -> f64 {
    1.0
}

impl FieldSpec {
    pub fn new(ordinal: usize, data_type: DataType, weight: f64) -> Self {
        Self {
            ordinal,
            name: String::new(),
            data_type,
            unit: String::new(),
            weight,
            min: None,
            max: None,
            dist_threshold: None,
            categorical_distances: CategoricalOverrides::default(),
            concept_hierarchy: None,
            component_weights: None,
        }
    }

    pub fn categorical(ordinal: usize, weight: f64) -> Self {
        Self::new(ordinal, DataType::Categorical, weight)
    }

    pub fn integer(ordinal: usize, weight: f64) -> Self {
        Self::new(ordinal, DataType::Integer, weight)
    }

    pub fn real(ordinal: usize, weight: f64) -> Self {
        Self::new(ordinal, DataType::Real, weight)
    }

    pub fn text(ordinal: usize, weight: f64) -> Self {
        Self::new(ordinal, DataType::Text, weight)
    }

    pub fn time_window(ordinal: usize, weight: f64) -> Self {
        Self::new(ordinal, DataType::TimeWindow, weight)
    }

    pub fn location(ordinal: usize, weight: f64) -> Self {
        Self::new(ordinal, DataType::Location, weight)
    }

    pub fn event(ordinal: usize, weight: f64) -> Self {
        Self::new(ordinal, DataType::Event, weight)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.dist_threshold = Some(threshold);
        self
    }

    pub fn with_override(mut self, a: &str, b: &str, distance: f64) -> Self {
        self.categorical_distances.insert(a, b, distance);
        self
    }

    pub fn with_parent(mut self, child: &str, parent: &str) -> Self {
        self.concept_hierarchy
            .get_or_insert_with(ConceptHierarchy::default)
            .insert(child, parent);
        self
    }

    pub fn with_component_weights(mut self, weights: Vec<f64>) -> Self {
        self.component_weights = Some(weights);
        self
    }

    /// Declared `(min, max)` when it spans a positive width
    pub fn numeric_range(&self) -> Option<(f64, f64)> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if max > min => Some((min, max)),
            _ => None,
        }
    }

    /// True when this field vetoes a pair at the given distance
    #[inline]
    pub fn is_threshold_crossed(&self, distance: f64) -> bool {
        matches!(self.dist_threshold, Some(t) if t > 0.0 && distance > t)
    }
}

/// Semantic data type of an attribute
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    Categorical,
    #[serde(rename = "int", alias = "integer")]
    Integer,
    #[serde(rename = "double", alias = "real")]
    Real,
    Text,
    TimeWindow,
    Location,
    Event,
}

impl DataType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Integer | DataType::Real)
    }

    pub fn is_structured(self) -> bool {
        matches!(self, DataType::TimeWindow | DataType::Location | DataType::Event)
    }
}

/// Missing-value policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum MissingValuePolicy {
    /// A missing value counts as maximal distance (1.0)
    #[default]
    #[serde(rename = "default")]
    Impute,
    /// A missing value removes the field from the aggregate
    #[serde(rename = "skip")]
    Skip,
}

impl std::str::FromStr for MissingValuePolicy {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Impute),
            "skip" => Ok(Self::Skip),
            other => Err(SchemaError::Parse(format!("unknown missing value policy '{}'", other))),
        }
    }
}

/// Aggregation of per-field distances
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub enum DistanceAlgorithm {
    /// Weighted arithmetic mean
    #[default]
    WeightedMean,
    /// Same as weighted mean
    Manhattan,
    /// Square root of the weighted mean of squares
    Euclidean,
    /// Weighted power mean with the given exponent (>= 1)
    Minkowski(f64),
}

impl DistanceAlgorithm {
    pub fn exponent(self) -> f64 {
        match self {
            DistanceAlgorithm::WeightedMean | DistanceAlgorithm::Manhattan => 1.0,
            DistanceAlgorithm::Euclidean => 2.0,
            DistanceAlgorithm::Minkowski(p) => p,
        }
    }
}

/// Text comparison method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlgorithm {
    /// Jaccard distance over lowercase whitespace tokens
    #[default]
    Jaccard,
    /// Jaccard distance over padded character trigrams
    Trigram,
    /// Case-insensitive equality
    Exact,
}

/// One entry of a categorical override table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoricalDistance {
    pub this_value: String,
    pub that_value: String,
    pub distance: f64,
}

/// Symmetric lookup table of custom categorical distances
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CategoricalDistance>", into = "Vec<CategoricalDistance>")]
pub struct CategoricalOverrides {
    table: FastMap<String, FastMap<String, f64>>,
    entries: Vec<CategoricalDistance>,
}

impl CategoricalOverrides {
    pub fn insert(&mut self, a: &str, b: &str, distance: f64) {
        self.table
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string(), distance);
        self.table
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string(), distance);
        self.entries.push(CategoricalDistance {
            this_value: a.to_string(),
            that_value: b.to_string(),
            distance,
        });
    }

    /// Distance for the unordered pair `{a, b}`, if declared
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.table.get(a).and_then(|m| m.get(b)).copied()
    }

    /// Declared entries in declaration order
    pub fn entries(&self) -> &[CategoricalDistance] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl From<Vec<CategoricalDistance>> for CategoricalOverrides {
    fn from(entries: Vec<CategoricalDistance>) -> Self {
        let mut overrides = Self::default();
        // first declaration of a pair wins, as with a linear scan
        for entry in entries.into_iter().rev() {
            overrides.insert(&entry.this_value, &entry.that_value, entry.distance);
        }
        overrides.entries.reverse();
        overrides
    }
}

impl From<CategoricalOverrides> for Vec<CategoricalDistance> {
    fn from(overrides: CategoricalOverrides) -> Self {
        overrides.entries
    }
}

/// Child to parent mapping of categorical values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptHierarchy {
    parents: FastMap<String, String>,
}

impl ConceptHierarchy {
    pub fn insert(&mut self, child: &str, parent: &str) {
        self.parents.insert(child.to_string(), parent.to_string());
    }

    pub fn parent(&self, child: &str) -> Option<&str> {
        self.parents.get(child).map(String::as_str)
    }
}

/// Errors that can occur during schema loading and validation
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema must declare at least one field")]
    EmptySchema,

    #[error("Field ordinal {0} declared more than once")]
    DuplicateOrdinal(usize),

    #[error("Field {0} has a negative or non-finite weight")]
    NegativeWeight(usize),

    #[error("Field {0} has a negative or non-finite distance threshold")]
    InvalidThreshold(usize),

    #[error("Field {ordinal} override '{this_value}'/'{that_value}' has distance {distance}, expected a value in [0, 1]")]
    InvalidOverrideDistance {
        ordinal: usize,
        this_value: String,
        that_value: String,
        distance: f64,
    },

    #[error("Field {ordinal} declares {actual} component weights, expected {expected}")]
    InvalidComponentWeights {
        ordinal: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Location component weights must have 3 entries, got {0}")]
    InvalidLocationWeights(usize),

    #[error("Numeric difference threshold {0} must be a non-negative number")]
    InvalidNumericThreshold(f64),

    #[error("Minkowski exponent {0} must be at least 1")]
    InvalidExponent(f64),

    #[error("Faceted field {0} not found in schema")]
    FacetNotInSchema(usize),

    #[error("Schema parse error: {0}")]
    Parse(String),

    #[error("Schema read error: {0}")]
    Io(String),
}

impl From<SchemaError> for pairsim_core::Error {
    fn from(e: SchemaError) -> Self {
        pairsim_core::Error::InvalidSchema(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_schema() -> Schema {
        Schema::new(
            0,
            vec![
                FieldSpec::categorical(1, 1.0).named("color"),
                FieldSpec::real(2, 2.0).named("price").with_range(0.0, 100.0),
                FieldSpec::text(3, 0.5).named("title"),
            ],
        )
    }

    #[test]
    fn test_schema_creation() {
        let schema = product_schema();
        assert_eq!(schema.version, 1);
        assert_eq!(schema.fields.len(), 3);
        assert_eq!(schema.ordinals(), vec![1, 2, 3]);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_empty_schema_error() {
        let schema = Schema::new(0, Vec::new());
        assert!(matches!(schema.validate(), Err(SchemaError::EmptySchema)));
    }

    #[test]
    fn test_duplicate_ordinal_error() {
        let schema = Schema::new(
            0,
            vec![FieldSpec::categorical(1, 1.0), FieldSpec::text(1, 1.0)],
        );
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::DuplicateOrdinal(1))
        ));
    }

    #[test]
    fn test_negative_weight_error() {
        let schema = Schema::new(0, vec![FieldSpec::categorical(1, -0.5)]);
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::NegativeWeight(1))
        ));
    }

    #[test]
    fn test_component_weight_arity() {
        let schema = Schema::new(
            0,
            vec![FieldSpec::location(1, 1.0).with_component_weights(vec![1.0, 1.0])],
        );
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::InvalidComponentWeights {
                ordinal: 1,
                expected: 3,
                actual: 2
            })
        ));

        let schema = Schema::new(
            0,
            vec![FieldSpec::categorical(1, 1.0).with_component_weights(vec![1.0])],
        );
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_numeric_range_requires_positive_width() {
        assert_eq!(
            FieldSpec::real(1, 1.0).with_range(0.0, 10.0).numeric_range(),
            Some((0.0, 10.0))
        );
        assert_eq!(FieldSpec::real(1, 1.0).with_range(5.0, 5.0).numeric_range(), None);
        assert_eq!(FieldSpec::real(1, 1.0).numeric_range(), None);
    }

    #[test]
    fn test_threshold_crossed() {
        let field = FieldSpec::categorical(1, 1.0).with_threshold(0.5);
        assert!(field.is_threshold_crossed(0.6));
        assert!(!field.is_threshold_crossed(0.5));

        // zero threshold disables the veto
        let field = FieldSpec::categorical(1, 1.0).with_threshold(0.0);
        assert!(!field.is_threshold_crossed(1.0));
    }

    #[test]
    fn test_overrides_are_symmetric() {
        let field = FieldSpec::categorical(1, 1.0).with_override("red", "maroon", 0.2);
        assert_eq!(field.categorical_distances.get("red", "maroon"), Some(0.2));
        assert_eq!(field.categorical_distances.get("maroon", "red"), Some(0.2));
        assert_eq!(field.categorical_distances.get("red", "blue"), None);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "id_ordinal": 0,
            "partition_ordinal": 4,
            "missing_value_policy": "skip",
            "numeric_diff_threshold": 0.1,
            "distance_algorithm": {"minkowski": 3.0},
            "text_algorithm": "trigram",
            "fields": [
                {"ordinal": 1, "type": "categorical",
                 "categorical_distances": [
                    {"this_value": "red", "that_value": "maroon", "distance": 0.3}
                 ],
                 "concept_hierarchy": {"laptop": "computer"}},
                {"ordinal": 2, "type": "int", "unit": "kg", "min": 0, "max": 50},
                {"ordinal": 3, "type": "double", "weight": 2.5, "dist_threshold": 0.4},
                {"ordinal": 5, "type": "timeWindow"}
            ]
        }"#;
        let schema = Schema::from_json(json).unwrap();
        assert_eq!(schema.partition_ordinal, Some(4));
        assert_eq!(schema.missing_value_policy, MissingValuePolicy::Skip);
        assert_eq!(schema.distance_algorithm, DistanceAlgorithm::Minkowski(3.0));
        assert_eq!(schema.text_algorithm, TextAlgorithm::Trigram);
        assert_eq!(schema.fields[0].categorical_distances.get("maroon", "red"), Some(0.3));
        assert_eq!(
            schema.fields[0].concept_hierarchy.as_ref().unwrap().parent("laptop"),
            Some("computer")
        );
        assert_eq!(schema.fields[1].data_type, DataType::Integer);
        assert_eq!(schema.fields[1].unit, "kg");
        assert_eq!(schema.fields[2].weight, 2.5);
        assert_eq!(schema.fields[3].data_type, DataType::TimeWindow);
        assert_eq!(schema.layout(), RecordLayout::new(0, Some(4)));
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            Schema::from_json("{not json"),
            Err(SchemaError::Parse(_))
        ));
        assert!(matches!(
            Schema::from_json(r#"{"id_ordinal": 0, "fields": []}"#),
            Err(SchemaError::EmptySchema)
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let schema = product_schema()
            .with_missing_value_policy(MissingValuePolicy::Skip)
            .with_distance_algorithm(DistanceAlgorithm::Euclidean);
        let mut schema = schema;
        schema.fields[0] = schema.fields[0]
            .clone()
            .with_override("red", "maroon", 0.2)
            .with_parent("maroon", "red");

        let json = serde_json::to_string(&schema).unwrap();
        let parsed: Schema = serde_json::from_str(&json).unwrap();

        assert_eq!(schema, parsed);
    }

    #[test]
    fn test_from_json_rejects_out_of_range_override() {
        let json = |distance: &str| {
            format!(
                r#"{{"id_ordinal": 0, "fields": [{{"ordinal": 1, "type": "categorical",
                    "categorical_distances": [{{"this_value": "red", "that_value": "green", "distance": {}}}]}}]}}"#,
                distance
            )
        };

        for distance in ["-3.0", "1.5"] {
            assert!(matches!(
                Schema::from_json(&json(distance)),
                Err(SchemaError::InvalidOverrideDistance { ordinal: 1, .. })
            ));
        }
        assert!(Schema::from_json(&json("0.0")).is_ok());
        assert!(Schema::from_json(&json("1.0")).is_ok());

        let schema = Schema::new(
            0,
            vec![FieldSpec::categorical(1, 1.0).with_override("red", "green", f64::NAN)],
        );
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::InvalidOverrideDistance { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"id_ordinal": 0, "fields": [{{"ordinal": 1, "type": "text"}}]}}"#).unwrap();

        let schema = Schema::load(file.path()).unwrap();
        assert_eq!(schema.fields[0].data_type, DataType::Text);
        assert_eq!(schema.fields[0].weight, 1.0);

        assert!(matches!(
            Schema::load(file.path().with_extension("missing")),
            Err(SchemaError::Io(_))
        ));
    }

    #[test]
    fn test_missing_policy_from_str() {
        assert_eq!("default".parse::<MissingValuePolicy>().unwrap(), MissingValuePolicy::Impute);
        assert_eq!("skip".parse::<MissingValuePolicy>().unwrap(), MissingValuePolicy::Skip);
        assert!("ignore".parse::<MissingValuePolicy>().is_err());
    }
}
