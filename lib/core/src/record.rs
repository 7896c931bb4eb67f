use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Partition label used when the schema declares no partition ordinal
pub const NO_PARTITION: &str = "none";

/// One delimited input row, positionally addressed by field ordinal
///
/// Records are immutable once read. They are shared behind `Arc` across all
/// of their fan-out copies, so replication never clones attribute data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    #[inline]
    #[must_use]
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Number of attribute strings in the record
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[inline]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Get the raw value at `ordinal`
    ///
    /// A record shorter than the ordinal requires is a structural error, not
    /// a missing value.
    pub fn field(&self, ordinal: usize) -> Result<&str> {
        self.fields
            .get(ordinal)
            .map(String::as_str)
            .ok_or_else(|| Error::InvalidOrdinal {
                ordinal,
                found: self.fields.len(),
                record: self.fields.join("|"),
            })
    }
}

impl<S: Into<String>> FromIterator<S> for Record {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Splits raw text lines into records with a delimiter pattern
#[derive(Debug, Clone)]
pub struct FieldSplitter {
    pattern: Regex,
}

impl FieldSplitter {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Split a line into a record. Trailing empty values are kept so that a
    /// missing last attribute reads as missing rather than as a short record.
    pub fn record(&self, line: &str) -> Record {
        self.pattern.split(line).collect()
    }

    /// Split a structured attribute value into its sub-components
    pub fn parts<'r, 'h>(&'r self, value: &'h str) -> regex::Split<'r, 'h> {
        self.pattern.split(value)
    }
}

/// Where the identity and partition attributes live in a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLayout {
    pub id_ordinal: usize,
    #[serde(default)]
    pub partition_ordinal: Option<usize>,
}

impl RecordLayout {
    pub fn new(id_ordinal: usize, partition_ordinal: Option<usize>) -> Self {
        Self {
            id_ordinal,
            partition_ordinal,
        }
    }

    /// Identity value of a record
    #[inline]
    pub fn id<'a>(&self, record: &'a Record) -> Result<&'a str> {
        record.field(self.id_ordinal)
    }

    /// Partition label of a record, or [`NO_PARTITION`]
    #[inline]
    pub fn partition<'a>(&self, record: &'a Record) -> Result<&'a str> {
        match self.partition_ordinal {
            Some(ordinal) => record.field(ordinal),
            None => Ok(NO_PARTITION),
        }
    }
}
