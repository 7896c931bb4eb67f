//! Aggregation of per-field distances into one pair score

use crate::schema::DistanceAlgorithm;

/// Integer pair score; 0 is identical, `scale` is maximally distant
pub type Score = u32;

/// Per-pair accumulator
///
/// A strategy must be reset before every pair. The engine creates a fresh one
/// per pair and resets it anyway, so no state survives between pairs.
pub trait DistanceStrategy {
    fn reset(&mut self);

    fn accumulate(&mut self, distance: f64, weight: f64);

    /// Scaled aggregate of everything accumulated since the last reset
    fn score(&self) -> Score;
}

/// Weighted power mean: `(Σ w·dᵖ / Σ w)^(1/p) × scale`
///
/// With `p = 1` this is the weighted arithmetic mean.
#[derive(Debug, Clone)]
pub struct MinkowskiStrategy {
    exponent: f64,
    scale: Score,
    weighted_sum: f64,
    weight_sum: f64,
}

impl MinkowskiStrategy {
    pub fn new(exponent: f64, scale: Score) -> Self {
        Self {
            exponent,
            scale,
            weighted_sum: 0.0,
            weight_sum: 0.0,
        }
    }

    pub fn weight_sum(&self) -> f64 {
        self.weight_sum
    }
}

impl DistanceStrategy for MinkowskiStrategy {
    fn reset(&mut self) {
        self.weighted_sum = 0.0;
        self.weight_sum = 0.0;
    }

    fn accumulate(&mut self, distance: f64, weight: f64) {
        let term = if self.exponent == 1.0 {
            distance
        } else {
            distance.powf(self.exponent)
        };
        self.weighted_sum += term * weight;
        self.weight_sum += weight;
    }

    fn score(&self) -> Score {
        // nothing compared: no evidence of similarity
        if self.weight_sum <= 0.0 {
            return self.scale;
        }
        let mean = self.weighted_sum / self.weight_sum;
        let aggregate = if self.exponent == 1.0 {
            mean
        } else {
            mean.powf(1.0 / self.exponent)
        };
        (aggregate * f64::from(self.scale)).round() as Score
    }
}

impl DistanceAlgorithm {
    pub fn strategy(self, scale: Score) -> MinkowskiStrategy {
        MinkowskiStrategy::new(self.exponent(), scale)
    }
}
