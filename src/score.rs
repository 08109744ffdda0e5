//! Difference scoring
//!
//! This module computes a bounded dissimilarity score between two feature
//! summaries: a weighted blend of the brightness delta and a symmetric
//! chi-square distance per HSV histogram, clamped to `[0, 1]`.

use crate::config::ScoreWeights;
use crate::types::{FeatureSummary, HIST_BINS};

/// Stabilizer for chi-square bins where both histograms are near zero.
const CHI_EPSILON: f64 = 1e-7;

/// Scorer combining per-channel differences with configured weights.
#[derive(Debug, Clone)]
pub struct DifferenceScorer {
    weights: ScoreWeights,
}

impl Default for DifferenceScorer {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

impl DifferenceScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Score the dissimilarity of `a` against a baseline `b`.
    ///
    /// Returns 1.0 when no baseline exists: with nothing to compare against,
    /// everything counts as changed.
    pub fn score(&self, a: &FeatureSummary, b: Option<&FeatureSummary>) -> f64 {
        let Some(b) = b else {
            return 1.0;
        };

        let brightness_diff = (a.brightness - b.brightness).abs();
        let hue_dist = chi_square(&a.hue, &b.hue);
        let sat_dist = chi_square(&a.saturation, &b.saturation);
        let val_dist = chi_square(&a.value, &b.value);

        let total = self.weights.brightness * brightness_diff
            + self.weights.hue * hue_dist
            + self.weights.saturation * sat_dist
            + self.weights.value * val_dist;

        total.min(1.0)
    }
}

/// Symmetric chi-square distance between two normalized histograms,
/// clamped to at most 1.0.
fn chi_square(a: &[f64; HIST_BINS], b: &[f64; HIST_BINS]) -> f64 {
    let dist: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2) / (x + y + CHI_EPSILON))
        .sum();
    dist.min(1.0)
}
