//! Job configuration
//!
//! Every recognized run option with its default. A config can be read from a
//! JSON file, where missing keys take their defaults, and is validated once
//! before any record is processed.

use crate::output::OutputFormat;
use pairsim_core::{Error, FieldSplitter, Result};
use pairsim_similarity::{EngineOptions, MissingValuePolicy, Schema, Score, DEFAULT_SUB_FIELD_DELIM};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Number of hash buckets; each record is replicated this many times
    pub bucket_count: usize,
    /// Number of partitions the group stage is routed into
    pub num_partitions: usize,
    /// Worker threads for the parallel stages; `None` uses all cores
    pub parallelism: Option<usize>,
    /// Pattern splitting an input line into attributes
    pub field_delim_regex: String,
    /// Pattern splitting a structured attribute into components
    pub sub_field_delim_regex: String,
    /// Separator of output line values
    pub output_delim: String,
    /// Score of maximally distant records
    pub scale: Score,
    /// Highest score that is still emitted; defaults to `scale`
    pub dist_threshold: Option<Score>,
    /// Overrides the schema's numeric difference threshold
    pub numeric_diff_threshold: Option<f64>,
    /// Overrides the schema's missing-value policy
    pub missing_value_policy: Option<MissingValuePolicy>,
    /// Only these ordinals take part in the distance
    pub faceted_fields: Option<Vec<usize>>,
    /// Carry non-participating attribute values into the output
    pub include_passive_fields: bool,
    /// Put the id pair before the passive values
    pub output_id_first: bool,
    /// Only compare records with the same entity id from different sets
    pub inter_set_matching: bool,
    /// Length of the set prefix in front of every entity id
    pub set_id_size: usize,
    pub output_format: OutputFormat,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            bucket_count: 1000,
            num_partitions: 1,
            parallelism: None,
            field_delim_regex: ",".to_string(),
            sub_field_delim_regex: DEFAULT_SUB_FIELD_DELIM.to_string(),
            output_delim: ",".to_string(),
            scale: 1000,
            dist_threshold: None,
            numeric_diff_threshold: None,
            missing_value_policy: None,
            faceted_fields: None,
            include_passive_fields: false,
            output_id_first: true,
            inter_set_matching: false,
            set_id_size: 0,
            output_format: OutputFormat::default(),
        }
    }
}

impl JobConfig {
    /// Read a JSON config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket_count < 2 || self.bucket_count % 2 != 0 {
            return Err(Error::InvalidBucketCount(self.bucket_count));
        }
        if self.num_partitions == 0 {
            return Err(Error::InvalidConfig("num_partitions must be at least 1".into()));
        }
        if self.parallelism == Some(0) {
            return Err(Error::InvalidConfig("parallelism must be at least 1".into()));
        }
        if self.scale == 0 {
            return Err(Error::InvalidConfig("scale must be positive".into()));
        }
        if let Some(threshold) = self.numeric_diff_threshold {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "numeric_diff_threshold {} must be a non-negative number",
                    threshold
                )));
            }
        }
        FieldSplitter::new(&self.field_delim_regex)?;
        FieldSplitter::new(&self.sub_field_delim_regex)?;
        Ok(())
    }

    /// Output threshold in effect
    pub fn effective_dist_threshold(&self) -> Score {
        self.dist_threshold.unwrap_or(self.scale)
    }

    /// Set prefix length when inter-set matching is on
    pub fn inter_set_prefix(&self) -> Option<usize> {
        self.inter_set_matching.then_some(self.set_id_size)
    }

    /// Apply schema-level overrides before the schema is frozen
    pub fn apply_to_schema(&self, mut schema: Schema) -> Schema {
        if let Some(threshold) = self.numeric_diff_threshold {
            schema.numeric_diff_threshold = threshold;
        }
        if let Some(policy) = self.missing_value_policy {
            schema.missing_value_policy = policy;
        }
        schema
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            scale: self.scale,
            dist_threshold: self.effective_dist_threshold(),
            faceted_fields: self.faceted_fields.clone(),
            include_passive_fields: self.include_passive_fields,
            sub_field_delim: self.sub_field_delim_regex.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairsim_similarity::FieldSpec;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = JobConfig::default();
        assert_eq!(config.bucket_count, 1000);
        assert_eq!(config.effective_dist_threshold(), 1000);
        assert_eq!(config.inter_set_prefix(), None);
        assert!(config.output_id_first);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        let odd = JobConfig {
            bucket_count: 7,
            ..JobConfig::default()
        };
        assert!(matches!(odd.validate(), Err(Error::InvalidBucketCount(7))));

        let no_partitions = JobConfig {
            num_partitions: 0,
            ..JobConfig::default()
        };
        assert!(matches!(no_partitions.validate(), Err(Error::InvalidConfig(_))));

        let bad_pattern = JobConfig {
            field_delim_regex: "[".to_string(),
            ..JobConfig::default()
        };
        assert!(matches!(bad_pattern.validate(), Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"bucket_count": 20, "missing_value_policy": "skip", "inter_set_matching": true, "set_id_size": 2}}"#
        )
        .unwrap();

        let config = JobConfig::load(file.path()).unwrap();
        assert_eq!(config.bucket_count, 20);
        assert_eq!(config.scale, 1000);
        assert_eq!(config.missing_value_policy, Some(MissingValuePolicy::Skip));
        assert_eq!(config.inter_set_prefix(), Some(2));
    }

    #[test]
    fn test_schema_overrides() {
        let schema = Schema::new(0, vec![FieldSpec::real(1, 1.0)]);
        let config = JobConfig {
            numeric_diff_threshold: Some(0.25),
            missing_value_policy: Some(MissingValuePolicy::Skip),
            ..JobConfig::default()
        };
        let schema = config.apply_to_schema(schema);
        assert_eq!(schema.numeric_diff_threshold, 0.25);
        assert_eq!(schema.missing_value_policy, MissingValuePolicy::Skip);
    }
}
