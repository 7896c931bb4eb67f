//! Structured attributes
//!
//! Time windows, locations and events arrive as one attribute string whose
//! components are separated by the sub-field delimiter:
//!
//! | type        | components                                              |
//! |-------------|---------------------------------------------------------|
//! | time window | `start`, `end`                                          |
//! | location    | `postal code`, `city`, `region`                         |
//! | event       | `description`, 3 location components, 2 window components |
//!
//! Decomposition is fixed here; how two decomposed values are compared is up
//! to a [`StructuredDistance`] implementation.

use crate::distance::jaccard_token_distance;
use chrono::{DateTime, NaiveDateTime};
use pairsim_core::FieldSplitter;
use smallvec::SmallVec;
use std::fmt::Debug;

/// Accepted textual timestamp layout besides RFC 3339 and epoch millis
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructuredParseError {
    #[error("expected {expected} components, found {actual}")]
    WrongArity { expected: usize, actual: usize },

    #[error("unparseable timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("time window ends before it starts")]
    InvertedWindow,
}

type Parts<'a> = SmallVec<[&'a str; 6]>;

fn split_parts<'a>(
    raw: &'a str,
    splitter: &FieldSplitter,
    expected: usize,
) -> Result<Parts<'a>, StructuredParseError> {
    let parts: Parts<'a> = splitter.parts(raw).map(str::trim).collect();
    if parts.len() != expected {
        return Err(StructuredParseError::WrongArity {
            expected,
            actual: parts.len(),
        });
    }
    Ok(parts)
}

/// Parse a timestamp into epoch milliseconds
pub fn parse_instant(raw: &str) -> Result<i64, StructuredParseError> {
    let raw = raw.trim();
    if let Ok(millis) = raw.parse::<i64>() {
        return Ok(millis);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc().timestamp_millis())
        .map_err(|_| StructuredParseError::InvalidTimestamp(raw.to_string()))
}

/// Closed interval of epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Result<Self, StructuredParseError> {
        if end < start {
            return Err(StructuredParseError::InvertedWindow);
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, StructuredParseError> {
        Self::new(parse_instant(start)?, parse_instant(end)?)
    }

    pub fn decompose(raw: &str, splitter: &FieldSplitter) -> Result<Self, StructuredParseError> {
        let parts = split_parts(raw, splitter, 2)?;
        Self::parse(parts[0], parts[1])
    }

    // Lengths are widened to i128: any two i64 instants differ by at most
    // 2^64 - 1, which would overflow i64.
    pub fn length(&self) -> i128 {
        i128::from(self.end) - i128::from(self.start)
    }

    /// Length of the intersection, 0 when disjoint
    pub fn overlap(&self, other: &TimeWindow) -> i128 {
        (i128::from(self.end.min(other.end)) - i128::from(self.start.max(other.start))).max(0)
    }

    /// Length of the smallest window covering both
    pub fn span(&self, other: &TimeWindow) -> i128 {
        i128::from(self.end.max(other.end)) - i128::from(self.start.min(other.start))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub postal_code: String,
    pub city: String,
    pub region: String,
}

impl Location {
    pub fn new(postal_code: &str, city: &str, region: &str) -> Self {
        Self {
            postal_code: postal_code.to_string(),
            city: city.to_string(),
            region: region.to_string(),
        }
    }

    pub fn decompose(raw: &str, splitter: &FieldSplitter) -> Result<Self, StructuredParseError> {
        let parts = split_parts(raw, splitter, 3)?;
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }

    fn components(&self) -> [&str; 3] {
        [&self.postal_code, &self.city, &self.region]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub description: String,
    pub location: Location,
    pub time_window: TimeWindow,
}

impl Event {
    pub fn decompose(raw: &str, splitter: &FieldSplitter) -> Result<Self, StructuredParseError> {
        let parts = split_parts(raw, splitter, 6)?;
        Ok(Self {
            description: parts[0].to_string(),
            location: Location::new(parts[1], parts[2], parts[3]),
            time_window: TimeWindow::parse(parts[4], parts[5])?,
        })
    }
}

/// Distance between decomposed structured values, in `[0.0, 1.0]`
pub trait StructuredDistance: Send + Sync + Debug {
    fn time_window(&self, a: &TimeWindow, b: &TimeWindow) -> f64;

    /// `weights` applies to (postal code, city, region)
    fn location(&self, a: &Location, b: &Location, weights: Option<&[f64]>) -> f64;

    /// `weights` applies to (description, location, time window)
    fn event(
        &self,
        a: &Event,
        b: &Event,
        weights: Option<&[f64]>,
        location_weights: Option<&[f64]>,
    ) -> f64;
}

/// Overlap-based windows, component-mismatch locations, weighted events
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStructuredDistance;

const EQUAL_WEIGHTS: [f64; 3] = [1.0, 1.0, 1.0];

fn weighted_mean(distances: [f64; 3], weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    distances
        .iter()
        .zip(weights)
        .map(|(d, w)| d * w)
        .sum::<f64>()
        / total
}

impl StructuredDistance for DefaultStructuredDistance {
    fn time_window(&self, a: &TimeWindow, b: &TimeWindow) -> f64 {
        let span = a.span(b);
        if span == 0 {
            return 0.0;
        }
        1.0 - a.overlap(b) as f64 / span as f64
    }

    fn location(&self, a: &Location, b: &Location, weights: Option<&[f64]>) -> f64 {
        let mut mismatches = [0.0; 3];
        for (i, (x, y)) in a.components().iter().zip(b.components()).enumerate() {
            if !x.eq_ignore_ascii_case(y) {
                mismatches[i] = 1.0;
            }
        }
        weighted_mean(mismatches, weights.unwrap_or(&EQUAL_WEIGHTS))
    }

    fn event(
        &self,
        a: &Event,
        b: &Event,
        weights: Option<&[f64]>,
        location_weights: Option<&[f64]>,
    ) -> f64 {
        let distances = [
            jaccard_token_distance(&a.description, &b.description),
            self.location(&a.location, &b.location, location_weights),
            self.time_window(&a.time_window, &b.time_window),
        ];
        weighted_mean(distances, weights.unwrap_or(&EQUAL_WEIGHTS))
    }
}
