//! Sensor-driven trigger state machine
//!
//! Two independent concerns are computed from every GSR reading:
//!
//! - An intensity level, a monotone step function of the latest reading,
//!   published continuously for the downstream parameter consumer.
//! - Drastic-change episode detection: a large jump away from the last
//!   stable value, followed by a low-variance plateau, raises the shared
//!   force trigger exactly once per episode.
//!
//! The episode machinery exists to catch a person settling into a new
//! physiological state, not every small fluctuation: it demands both the
//! jump and the subsequent plateau before acting.

use crate::config::SensorTriggerConfig;
use crate::coordinator::TriggerCoordinator;
use crate::types::SensorUpdate;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Stateful controller over the scalar GSR stream.
#[derive(Debug)]
pub struct SensorTriggerController {
    config: SensorTriggerConfig,
    coordinator: TriggerCoordinator,
    history: VecDeque<i64>,
    last_stable_value: Option<i64>,
    change_detected: bool,
}

impl SensorTriggerController {
    pub fn new(config: SensorTriggerConfig, coordinator: TriggerCoordinator) -> Self {
        let capacity = config.history_size;
        Self {
            config,
            coordinator,
            history: VecDeque::with_capacity(capacity),
            last_stable_value: None,
            change_detected: false,
        }
    }

    /// Feed one reading through both the intensity mapping and the
    /// stabilization state machine. Coordinator side effects (intensity
    /// publication, force-trigger raise) happen here.
    pub fn observe(&mut self, reading: i64) -> SensorUpdate {
        if self.history.len() == self.config.history_size {
            self.history.pop_front();
        }
        self.history.push_back(reading);

        let intensity_level = self.intensity_level(reading);
        self.coordinator.set_intensity_level(intensity_level);

        let stabilized = self.update_episode(reading);

        SensorUpdate {
            intensity_level,
            stabilized,
        }
    }

    /// Map a reading to its intensity level. Pure and total: the step table
    /// claims readings below each bound in order, everything above the last
    /// bound gets the ceiling level.
    pub fn intensity_level(&self, reading: i64) -> u32 {
        for step in &self.config.intensity_steps {
            if reading < step.below {
                return step.level;
            }
        }
        self.config.intensity_max_level
    }

    /// True while a drastic change is waiting for the signal to plateau.
    pub fn change_detected(&self) -> bool {
        self.change_detected
    }

    pub fn last_stable_value(&self) -> Option<i64> {
        self.last_stable_value
    }

    fn update_episode(&mut self, reading: i64) -> bool {
        let Some(baseline) = self.last_stable_value else {
            // Bootstrap: adopt the first plateau as the baseline without
            // raising a trigger.
            if self.history_is_plateau() {
                self.last_stable_value = Some(reading);
                debug!(baseline = reading, "sensor baseline established");
            }
            return false;
        };

        if !self.change_detected && (reading - baseline).abs() >= self.config.change_threshold {
            self.change_detected = true;
            info!(
                reading,
                baseline, "drastic sensor change detected, waiting for plateau"
            );
        }

        if self.change_detected && self.history_is_plateau() {
            self.change_detected = false;
            self.last_stable_value = Some(reading);
            self.coordinator.raise_force_trigger();
            info!(baseline = reading, "sensor stabilized, force trigger raised");
            return true;
        }

        false
    }

    /// True when the history is full and its spread fits inside the
    /// stability threshold.
    fn history_is_plateau(&self) -> bool {
        if self.history.len() < self.config.history_size {
            return false;
        }
        let max = self.history.iter().max().copied().unwrap_or(0);
        let min = self.history.iter().min().copied().unwrap_or(0);
        max - min <= self.config.stability_threshold
    }
}
