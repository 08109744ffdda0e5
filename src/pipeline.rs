//! Engine orchestration
//!
//! `TriggerEngine` is the public façade wiring the pieces together: frames
//! flow through feature extraction into the image controller, readings flow
//! into the sensor controller, and the shared coordinator carries the
//! force-trigger and intensity level between them.
//!
//! The engine owns all controller state; the only thing it shares with other
//! execution contexts is the coordinator handle.

use crate::config::EngineConfig;
use crate::coordinator::TriggerCoordinator;
use crate::error::VigilError;
use crate::features::FeatureExtractor;
use crate::frame::Frame;
use crate::image_trigger::ImageTriggerController;
use crate::sensor_trigger::SensorTriggerController;
use crate::types::{SensorReading, SensorUpdate, TriggerEvent};
use chrono::{DateTime, Utc};

/// Outcome of one frame tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    /// Dispatch event, when this tick decided to send
    pub event: Option<TriggerEvent>,
    /// Whether a change episode is still waiting for stability
    pub change_pending: bool,
    /// Monitoring status line for logging
    pub status: &'static str,
}

/// Stateful decision engine over both signal streams.
pub struct TriggerEngine {
    image: ImageTriggerController,
    sensor: SensorTriggerController,
    coordinator: TriggerCoordinator,
}

impl Default for TriggerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerEngine {
    /// Create an engine with default thresholds.
    pub fn new() -> Self {
        let coordinator = TriggerCoordinator::new();
        let config = EngineConfig::default();
        Self {
            image: ImageTriggerController::new(config.image),
            sensor: SensorTriggerController::new(config.sensor, coordinator.clone()),
            coordinator,
        }
    }

    /// Create an engine with validated custom thresholds.
    pub fn with_config(config: EngineConfig) -> Result<Self, VigilError> {
        config.validate()?;
        let coordinator = TriggerCoordinator::new();
        Ok(Self {
            image: ImageTriggerController::new(config.image),
            sensor: SensorTriggerController::new(config.sensor, coordinator.clone()),
            coordinator,
        })
    }

    /// Run one image-sampling tick.
    ///
    /// A pending force trigger pre-empts the normal cadence: the frame is
    /// dispatched immediately and becomes the new scoring baseline. The
    /// returned event is a decision only; actually shipping the frame is the
    /// dispatch collaborator's job, and its success or failure never flows
    /// back into the engine.
    pub fn process_frame(&mut self, frame: &Frame<'_>, now: DateTime<Utc>) -> TickReport {
        let features = FeatureExtractor::extract(frame);

        let decision = if self.coordinator.consume_force_trigger() {
            Some(self.image.force_send(features, now))
        } else {
            self.image.evaluate(features, now)
        };

        TickReport {
            event: decision.map(|d| TriggerEvent::new(d.reason, d.at)),
            change_pending: self.image.change_detected(),
            status: self.image.status(),
        }
    }

    /// Feed one serial line through the sensor controller.
    ///
    /// A reading without a `gsr` field is skipped, not an error; malformed
    /// JSON is.
    pub fn process_reading_json(&mut self, line: &str) -> Result<Option<SensorUpdate>, VigilError> {
        let reading: SensorReading = serde_json::from_str(line)?;
        Ok(reading.gsr.map(|gsr| self.process_gsr(gsr)))
    }

    /// Feed one GSR value directly.
    pub fn process_gsr(&mut self, gsr: i64) -> SensorUpdate {
        self.sensor.observe(gsr)
    }

    /// Clone of the shared coordinator handle, for the sampling loops and
    /// the downstream intensity consumer.
    pub fn coordinator(&self) -> TriggerCoordinator {
        self.coordinator.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SendReason;
    use chrono::TimeZone;

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(seconds)
    }

    fn solid_buffer(rgb: [u8; 3]) -> Vec<u8> {
        rgb.iter().copied().cycle().take(8 * 8 * 3).collect()
    }

    #[test]
    fn test_first_frame_dispatches_scheduled() {
        let mut engine = TriggerEngine::new();
        let buffer = solid_buffer([40, 40, 40]);
        let frame = Frame::new(&buffer, 8, 8).unwrap();

        let report = engine.process_frame(&frame, t(0));
        let event = report.event.unwrap();
        assert_eq!(event.reason, SendReason::Scheduled);
        assert_eq!(event.decided_at, t(0));
        assert_eq!(report.status, "monitoring");
    }

    #[test]
    fn test_static_scene_only_dispatches_on_the_floor() {
        let mut engine = TriggerEngine::new();
        let buffer = solid_buffer([40, 40, 40]);
        let frame = Frame::new(&buffer, 8, 8).unwrap();

        engine.process_frame(&frame, t(0));
        for seconds in 1..15 {
            assert!(engine.process_frame(&frame, t(seconds)).event.is_none());
        }
        let report = engine.process_frame(&frame, t(15));
        assert_eq!(report.event.unwrap().reason, SendReason::Scheduled);
    }

    #[test]
    fn test_scene_change_reported_as_pending() {
        let mut engine = TriggerEngine::new();
        let dark = solid_buffer([10, 10, 10]);
        let bright = solid_buffer([240, 120, 40]);

        engine.process_frame(&Frame::new(&dark, 8, 8).unwrap(), t(0));
        let report = engine.process_frame(&Frame::new(&bright, 8, 8).unwrap(), t(1));

        assert!(report.event.is_none());
        assert!(report.change_pending);
        assert_eq!(report.status, "change detected, waiting for stability");
    }

    #[test]
    fn test_sensor_stabilization_forces_next_frame() {
        let mut engine = TriggerEngine::new();
        let buffer = solid_buffer([40, 40, 40]);
        let frame = Frame::new(&buffer, 8, 8).unwrap();

        engine.process_frame(&frame, t(0));

        // Bootstrap, jump, plateau: raises the shared force trigger.
        for _ in 0..5 {
            engine.process_gsr(50);
        }
        engine.process_gsr(90);
        for _ in 0..5 {
            engine.process_gsr(90);
        }
        assert!(engine.coordinator().force_trigger_pending());

        // Next frame tick is pre-empted despite zero visual change and an
        // unexpired interval.
        let report = engine.process_frame(&frame, t(2));
        assert_eq!(report.event.unwrap().reason, SendReason::SensorChange);
        assert!(!engine.coordinator().force_trigger_pending());

        // Consumed: the following tick is back to normal monitoring.
        assert!(engine.process_frame(&frame, t(3)).event.is_none());
    }

    #[test]
    fn test_reading_json_paths() {
        let mut engine = TriggerEngine::new();

        // Missing gsr: skipped.
        assert!(engine
            .process_reading_json(r#"{"bpm": 70, "temp": 36.4}"#)
            .unwrap()
            .is_none());

        // Present gsr: processed and published.
        let update = engine
            .process_reading_json(r#"{"gsr": 90, "bpm": 70}"#)
            .unwrap()
            .unwrap();
        assert_eq!(update.intensity_level, 6);
        assert_eq!(engine.coordinator().intensity_level(), 6);

        // Malformed line: error.
        assert!(engine.process_reading_json("not json").is_err());
    }

    #[test]
    fn test_custom_config_is_validated() {
        let mut config = EngineConfig::default();
        config.image.weights.hue = 0.9;
        assert!(TriggerEngine::with_config(config).is_err());
        assert!(TriggerEngine::with_config(EngineConfig::default()).is_ok());
    }
}
