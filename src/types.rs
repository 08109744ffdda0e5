//! Core types for the Vigil decision layer
//!
//! This module defines the values that flow between the detection stages:
//! frame feature summaries, send decisions, emitted trigger events, and the
//! sensor readings delivered by the serial ingestion collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of bins in each color-channel histogram.
pub const HIST_BINS: usize = 16;

/// Compact numeric description of one frame, used in place of pixel data
/// for all comparisons.
///
/// Histograms are normalized (each sums to ≈1) over the OpenCV-convention
/// HSV ranges: hue over `[0, 180)`, saturation and value over `[0, 256)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    /// Mean luma of the frame, scaled to [0, 1]
    pub brightness: f64,
    /// Normalized hue histogram
    pub hue: [f64; HIST_BINS],
    /// Normalized saturation histogram
    pub saturation: [f64; HIST_BINS],
    /// Normalized value histogram
    pub value: [f64; HIST_BINS],
}

/// Why a frame was dispatched to the external analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendReason {
    /// The minimum-interval floor elapsed with no change required
    Scheduled,
    /// A drastic scene change settled into a stable view
    StableChange,
    /// The sensor stream forced an out-of-cycle dispatch
    SensorChange,
}

impl SendReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendReason::Scheduled => "scheduled",
            SendReason::StableChange => "stable_change",
            SendReason::SensorChange => "sensor_change",
        }
    }
}

/// A positive send decision produced by one evaluation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendDecision {
    pub reason: SendReason,
    /// Evaluation timestamp the decision was made at
    pub at: DateTime<Utc>,
}

/// A dispatched trigger, carrying provenance for the downstream emitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// Unique event id
    pub id: Uuid,
    pub reason: SendReason,
    pub decided_at: DateTime<Utc>,
}

impl TriggerEvent {
    pub fn new(reason: SendReason, decided_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            reason,
            decided_at,
        }
    }
}

/// One parsed line from the serial ingestion collaborator.
///
/// Only `gsr` feeds the sensor controller; `bpm` and `temp` are passed
/// through unmodified for the out-of-scope republisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(default)]
    pub gsr: Option<i64>,
    #[serde(default)]
    pub bpm: Option<i64>,
    #[serde(default)]
    pub temp: Option<f64>,
}

/// Outcome of feeding one reading through the sensor controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorUpdate {
    /// Current intensity level, always recomputed from the latest reading
    pub intensity_level: u32,
    /// True when this reading resolved a drastic-change episode and the
    /// shared force trigger was raised
    pub stabilized: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_reason_serializes_snake_case() {
        let json = serde_json::to_string(&SendReason::StableChange).unwrap();
        assert_eq!(json, "\"stable_change\"");
        assert_eq!(SendReason::SensorChange.as_str(), "sensor_change");
    }

    #[test]
    fn test_sensor_reading_tolerates_missing_fields() {
        let reading: SensorReading = serde_json::from_str(r#"{"bpm": 72}"#).unwrap();
        assert_eq!(reading.gsr, None);
        assert_eq!(reading.bpm, Some(72));
        assert_eq!(reading.temp, None);
    }

    #[test]
    fn test_sensor_reading_passthrough_fields() {
        let reading: SensorReading =
            serde_json::from_str(r#"{"gsr": 42, "bpm": 80, "temp": 36.5}"#).unwrap();
        assert_eq!(reading.gsr, Some(42));
        assert_eq!(reading.temp, Some(36.5));
    }
}
