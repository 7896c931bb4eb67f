//! Output records for qualifying pairs
//!
//! One line per pair: ids, passive values of the first record, passive
//! values of the second record, score. With `output_id_first = false` the
//! ids move behind the passive values but stay next to each other.

use pairsim_similarity::Score;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// A pair that passed the output threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonOutput {
    pub first_id: String,
    pub second_id: String,
    /// Passive attribute values of the first record
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub first_passive: Vec<String>,
    /// Passive attribute values of the second record
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub second_passive: Vec<String>,
    pub score: Score,
}

impl ComparisonOutput {
    pub fn new(first_id: &str, second_id: &str, score: Score) -> Self {
        Self {
            first_id: first_id.to_string(),
            second_id: second_id.to_string(),
            first_passive: Vec::new(),
            second_passive: Vec::new(),
            score,
        }
    }

    pub fn with_passive(mut self, first: Vec<String>, second: Vec<String>) -> Self {
        self.first_passive = first;
        self.second_passive = second;
        self
    }

    /// Ids as an unordered pair, smaller first
    pub fn id_pair(&self) -> (&str, &str) {
        if self.first_id <= self.second_id {
            (&self.first_id, &self.second_id)
        } else {
            (&self.second_id, &self.first_id)
        }
    }

    /// Render as a delimited line without trailing newline
    pub fn to_line(&self, delim: &str, id_first: bool) -> String {
        let mut line = String::new();

        if id_first {
            push_ids(&mut line, self, delim);
        }
        for value in self.first_passive.iter().chain(&self.second_passive) {
            line.push_str(value);
            line.push_str(delim);
        }
        if !id_first {
            push_ids(&mut line, self, delim);
        }

        line.push_str(&self.score.to_string());
        line
    }
}

fn push_ids(line: &mut String, output: &ComparisonOutput, delim: &str) {
    line.push_str(&output.first_id);
    line.push_str(delim);
    line.push_str(&output.second_id);
    line.push_str(delim);
}

/// Output record encoding
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Delimited text line
    #[default]
    Delimited,
    /// One JSON object per line
    Json,
}

/// Writes comparison outputs one per line
pub struct OutputWriter<W: Write> {
    inner: W,
    format: OutputFormat,
    delim: String,
    id_first: bool,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(inner: W, format: OutputFormat, delim: &str, id_first: bool) -> Self {
        Self {
            inner,
            format,
            delim: delim.to_string(),
            id_first,
        }
    }

    pub fn write(&mut self, output: &ComparisonOutput) -> io::Result<()> {
        match self.format {
            OutputFormat::Delimited => {
                writeln!(self.inner, "{}", output.to_line(&self.delim, self.id_first))
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.inner, output)?;
                self.inner.write_all(b"\n")
            }
        }
    }

    pub fn write_all<'a, I>(&mut self, outputs: I) -> io::Result<usize>
    where
        I: IntoIterator<Item = &'a ComparisonOutput>,
    {
        let mut written = 0;
        for output in outputs {
            self.write(output)?;
            written += 1;
        }
        self.inner.flush()?;
        Ok(written)
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
