//! Distance functions for the scalar field types
//!
//! All functions return a distance in `[0.0, 1.0]` where 0.0 means identical.

use crate::schema::FieldSpec;
use std::collections::HashSet;

/// Distance between two categorical values
///
/// Equal values are at distance 0. Otherwise the override table is consulted
/// for the unordered pair, then the concept hierarchy: when the second value's
/// parent is the first value the distance is 0. Everything else is 1.
pub fn categorical_distance(field: &FieldSpec, a: &str, b: &str) -> f64 {
    if a == b {
        return 0.0;
    }

    if let Some(distance) = field.categorical_distances.get(a, b) {
        return distance;
    }

    match &field.concept_hierarchy {
        Some(hierarchy) if hierarchy.parent(b) == Some(a) => 0.0,
        _ => 1.0,
    }
}

/// Distance between two numbers
///
/// With a declared range the distance is `|a - b| / (max - min)`, clamped to 1.
/// Without one it is binary: 1 when the relative difference
/// `|a - b| / max(a, b)` exceeds `diff_threshold`, else 0.
pub fn numeric_distance(a: f64, b: f64, range: Option<(f64, f64)>, diff_threshold: f64) -> f64 {
    if let Some((min, max)) = range {
        return ((a - b).abs() / (max - min)).min(1.0);
    }

    let larger = a.max(b);
    if larger == 0.0 {
        return if a == b { 0.0 } else { 1.0 };
    }
    let relative_diff = ((a - b) / larger).abs();
    if relative_diff > diff_threshold {
        1.0
    } else {
        0.0
    }
}

/// Strip an optional unit suffix from a numeric value
///
/// A bare token is accepted as is. A `"<number> <unit>"` pair is accepted only
/// when the unit equals `unit`. Anything else is unparseable.
pub fn strip_unit<'a>(raw: &'a str, unit: &str) -> Option<&'a str> {
    let mut tokens = raw.split_whitespace();
    let number = tokens.next()?;
    match (tokens.next(), tokens.next()) {
        (None, _) => Some(number),
        (Some(suffix), None) if suffix == unit => Some(number),
        _ => None,
    }
}

/// Parse both sides of an integer or real attribute
///
/// Returns `None` when either side is unparseable or carries the wrong unit.
pub fn parse_numeric_pair(a: &str, b: &str, unit: &str, integer: bool) -> Option<(f64, f64)> {
    let parse = |raw: &str| -> Option<f64> {
        let token = strip_unit(raw, unit)?;
        if integer {
            token.parse::<i64>().ok().map(|v| v as f64)
        } else {
            token.parse::<f64>().ok().filter(|v| v.is_finite())
        }
    };
    Some((parse(a)?, parse(b)?))
}

/// Jaccard distance between lowercase whitespace token sets
pub fn jaccard_token_distance(a: &str, b: &str) -> f64 {
    let tokens_a: HashSet<String> = a.split_whitespace().map(|s| s.to_lowercase()).collect();
    let tokens_b: HashSet<String> = b.split_whitespace().map(|s| s.to_lowercase()).collect();

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();

    if union == 0 {
        1.0
    } else {
        1.0 - intersection as f64 / union as f64
    }
}

/// Jaccard distance between padded character trigram sets
pub fn trigram_distance(a: &str, b: &str) -> f64 {
    let trigrams_a = generate_trigrams(&a.to_lowercase());
    let trigrams_b = generate_trigrams(&b.to_lowercase());

    if trigrams_a.is_empty() && trigrams_b.is_empty() {
        return 0.0;
    }

    if trigrams_a.is_empty() || trigrams_b.is_empty() {
        return 1.0;
    }

    let intersection = trigrams_a.intersection(&trigrams_b).count();
    let union = trigrams_a.union(&trigrams_b).count();

    if union == 0 {
        1.0
    } else {
        1.0 - intersection as f64 / union as f64
    }
}

/// Generate character trigrams from a string
fn generate_trigrams(s: &str) -> HashSet<String> {
    let padded = format!("  {}  ", s);
    let chars: Vec<char> = padded.chars().collect();

    if chars.len() < 3 {
        return HashSet::new();
    }

    chars.windows(3).map(|w| w.iter().collect::<String>()).collect()
}
