//! Free-text comparison
//!
//! Text fields are scored by a pluggable [`TextSimilarity`]. The built-in
//! implementations cover the algorithms a schema can name; callers with a
//! better model (embeddings, edit distance) supply their own.

use crate::distance::{jaccard_token_distance, trigram_distance};
use crate::schema::TextAlgorithm;
use std::fmt::Debug;
use std::sync::Arc;

/// Distance between two free-text values, in `[0.0, 1.0]`
pub trait TextSimilarity: Send + Sync + Debug {
    fn distance(&self, a: &str, b: &str) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JaccardText;

impl TextSimilarity for JaccardText {
    fn distance(&self, a: &str, b: &str) -> f64 {
        jaccard_token_distance(a, b)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrigramText;

impl TextSimilarity for TrigramText {
    fn distance(&self, a: &str, b: &str) -> f64 {
        trigram_distance(a, b)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExactText;

impl TextSimilarity for ExactText {
    fn distance(&self, a: &str, b: &str) -> f64 {
        if a.eq_ignore_ascii_case(b) {
            0.0
        } else {
            1.0
        }
    }
}

impl TextAlgorithm {
    /// Built-in implementation for this algorithm
    pub fn build(self) -> Arc<dyn TextSimilarity> {
        match self {
            TextAlgorithm::Jaccard => Arc::new(JaccardText),
            TextAlgorithm::Trigram => Arc::new(TrigramText),
            TextAlgorithm::Exact => Arc::new(ExactText),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_text() {
        let text = TextAlgorithm::Exact.build();
        assert_eq!(text.distance("hello", "HELLO"), 0.0);
        assert_eq!(text.distance("hello", "world"), 1.0);
    }

    #[test]
    fn test_jaccard_text() {
        let text = TextAlgorithm::Jaccard.build();
        assert_eq!(text.distance("blue cotton shirt", "shirt cotton blue"), 0.0);
        assert_eq!(text.distance("blue shirt", "red hat"), 1.0);
    }

    #[test]
    fn test_trigram_text() {
        let text = TextAlgorithm::Trigram.build();
        assert!(text.distance("colour", "color") < text.distance("colour", "shape"));
    }
}
