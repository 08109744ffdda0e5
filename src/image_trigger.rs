//! Image-driven trigger state machine
//!
//! Combines a time-based scheduling floor with change/stability detection to
//! decide when a frame is worth an external analysis call:
//!
//! 1. The minimum-interval floor always wins: at least one dispatch per
//!    `min_send_interval_secs`, even with zero visual change.
//! 2. Otherwise, a drastic difference from the *last sent* frame opens a
//!    change episode, and the episode resolves into a dispatch only after
//!    the scene holds stable for two consecutive evaluations.
//!
//! The baseline for all difference scoring is the most recent dispatched
//! frame, never the most recent captured one. Dispatch transport success is
//! invisible here by design: a failed external call must not desynchronize
//! the state machine.

use crate::config::ImageTriggerConfig;
use crate::score::DifferenceScorer;
use crate::stability::StabilityWindow;
use crate::types::{FeatureSummary, SendDecision, SendReason};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Stateful controller gating image dispatches.
#[derive(Debug)]
pub struct ImageTriggerController {
    config: ImageTriggerConfig,
    scorer: DifferenceScorer,
    window: StabilityWindow,
    last_sent_at: Option<DateTime<Utc>>,
    last_sent_features: Option<FeatureSummary>,
    change_detected: bool,
    stable_count: u32,
}

impl ImageTriggerController {
    pub fn new(config: ImageTriggerConfig) -> Self {
        let scorer = DifferenceScorer::new(config.weights);
        let window = StabilityWindow::new(config.stability_window);
        Self {
            config,
            scorer,
            window,
            last_sent_at: None,
            last_sent_features: None,
            change_detected: false,
            stable_count: 0,
        }
    }

    /// Run one evaluation tick over freshly extracted features.
    ///
    /// Returns a decision when the frame should be handed to the dispatch
    /// collaborator; the caller must treat the dispatch as fire-and-forget.
    pub fn evaluate(
        &mut self,
        features: FeatureSummary,
        now: DateTime<Utc>,
    ) -> Option<SendDecision> {
        self.window.push(features.clone());

        let interval_elapsed = match self.last_sent_at {
            None => true,
            Some(last) => seconds_between(last, now) >= self.config.min_send_interval_secs,
        };

        if interval_elapsed {
            // Unconditional floor: refresh the analyzer periodically even
            // with zero visual change.
            self.mark_sent(features, now);
            return Some(SendDecision {
                reason: SendReason::Scheduled,
                at: now,
            });
        }

        let diff = self
            .scorer
            .score(&features, self.last_sent_features.as_ref());

        if diff > self.config.change_threshold && !self.change_detected {
            self.change_detected = true;
            self.stable_count = 0;
            info!(difference = diff, "scene change detected, waiting for stability");
        }

        if self.change_detected {
            if self
                .window
                .is_stable(&self.scorer, self.config.stability_threshold)
            {
                self.stable_count += 1;
                debug!(stable_count = self.stable_count, "scene holding stable");
                if self.stable_count >= self.config.stable_checks_required {
                    self.mark_sent(features, now);
                    return Some(SendDecision {
                        reason: SendReason::StableChange,
                        at: now,
                    });
                }
            } else {
                // Stability must be consecutive, not cumulative.
                self.stable_count = 0;
            }
        }

        None
    }

    /// Record an out-of-cycle dispatch requested by the sensor stream.
    ///
    /// Bypasses the cadence entirely but still rebaselines, so subsequent
    /// scoring compares against the frame that actually went out.
    pub fn force_send(&mut self, features: FeatureSummary, now: DateTime<Utc>) -> SendDecision {
        self.window.push(features.clone());
        self.mark_sent(features, now);
        SendDecision {
            reason: SendReason::SensorChange,
            at: now,
        }
    }

    /// True while a change episode is waiting for the scene to settle.
    pub fn change_detected(&self) -> bool {
        self.change_detected
    }

    pub fn last_sent_at(&self) -> Option<DateTime<Utc>> {
        self.last_sent_at
    }

    /// Human-readable monitoring state for status output.
    pub fn status(&self) -> &'static str {
        if self.change_detected {
            "change detected, waiting for stability"
        } else {
            "monitoring"
        }
    }

    /// Rebaseline after any send decision. A new baseline ends any pending
    /// change episode: change must be re-detected relative to it.
    fn mark_sent(&mut self, features: FeatureSummary, now: DateTime<Utc>) {
        self.last_sent_at = Some(now);
        self.last_sent_features = Some(features);
        self.change_detected = false;
        self.stable_count = 0;
    }
}

fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0
}
