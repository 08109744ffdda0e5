//! Scene stability window
//!
//! A bounded history of recent feature summaries with a single predicate:
//! has the scene settled? Stability is a strict AND over every consecutive
//! pair in the inspected window; one unstable pair invalidates the whole
//! check.

use crate::score::DifferenceScorer;
use crate::types::FeatureSummary;
use std::collections::VecDeque;

/// Sliding history of the last `window + 1` feature summaries.
#[derive(Debug, Clone)]
pub struct StabilityWindow {
    history: VecDeque<FeatureSummary>,
    window: usize,
}

impl StabilityWindow {
    /// Create a window that inspects `window` consecutive frames. One extra
    /// slot is kept so the frame that triggered a change stays visible.
    pub fn new(window: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(window + 1),
            window,
        }
    }

    /// Record a new summary, evicting the oldest once at capacity.
    pub fn push(&mut self, summary: FeatureSummary) {
        if self.history.len() > self.window {
            self.history.pop_front();
        }
        self.history.push_back(summary);
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// True only if the most recent `window` samples exist and every
    /// consecutive pair scores at or below `threshold`.
    pub fn is_stable(&self, scorer: &DifferenceScorer, threshold: f64) -> bool {
        if self.history.len() < self.window {
            return false;
        }

        let recent: Vec<&FeatureSummary> =
            self.history.iter().rev().take(self.window).rev().collect();

        recent
            .windows(2)
            .all(|pair| scorer.score(pair[0], Some(pair[1])) <= threshold)
    }
}
