//! Tunable thresholds and weights
//!
//! Every constant the detection layer depends on lives here so that a single
//! parametrized controller replaces per-deployment copies of the logic. The
//! defaults are the empirically chosen values the installation runs with;
//! they are a reasonable starting point, not load-bearing contracts.

use crate::error::VigilError;
use serde::{Deserialize, Serialize};

/// Default minimum interval between external dispatches, in seconds.
pub const DEFAULT_MIN_SEND_INTERVAL_SECS: f64 = 15.0;

/// Default difference score above which a scene change is declared.
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 0.30;

/// Default pairwise score at or below which two frames count as stable.
pub const DEFAULT_STABILITY_THRESHOLD: f64 = 0.10;

/// Default number of consecutive frames the stability window inspects.
pub const DEFAULT_STABILITY_WINDOW: usize = 3;

/// Default GSR jump that starts a drastic-change episode.
pub const DEFAULT_SENSOR_CHANGE_THRESHOLD: i64 = 15;

/// Default GSR spread at or below which the history counts as a plateau.
pub const DEFAULT_SENSOR_STABILITY_THRESHOLD: i64 = 5;

/// Default GSR history length.
pub const DEFAULT_SENSOR_HISTORY: usize = 5;

/// Weights combining the four per-channel differences into one score.
///
/// Brightness and hue carry more perceptual signal than saturation for
/// "has the scene changed" purposes. The weights must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub brightness: f64,
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            brightness: 0.30,
            hue: 0.25,
            saturation: 0.20,
            value: 0.25,
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.brightness + self.hue + self.saturation + self.value
    }
}

/// Configuration for the image-driven trigger controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageTriggerConfig {
    /// Unconditional floor: a dispatch at least this often, in seconds
    pub min_send_interval_secs: f64,
    /// Difference from the last sent frame that declares a change
    pub change_threshold: f64,
    /// Pairwise difference at or below which frames count as stable
    pub stability_threshold: f64,
    /// Number of consecutive frames inspected for stability
    pub stability_window: usize,
    /// Consecutive stable evaluations required before sending
    pub stable_checks_required: u32,
    pub weights: ScoreWeights,
}

impl Default for ImageTriggerConfig {
    fn default() -> Self {
        Self {
            min_send_interval_secs: DEFAULT_MIN_SEND_INTERVAL_SECS,
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            stability_threshold: DEFAULT_STABILITY_THRESHOLD,
            stability_window: DEFAULT_STABILITY_WINDOW,
            stable_checks_required: 2,
            weights: ScoreWeights::default(),
        }
    }
}

/// One step of the intensity mapping: readings strictly below `below` map
/// to `level`, unless an earlier step already claimed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntensityStep {
    pub below: i64,
    pub level: u32,
}

/// Configuration for the sensor-driven trigger controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorTriggerConfig {
    /// Jump from the last stable value that starts an episode
    pub change_threshold: i64,
    /// History spread at or below which the signal counts as a plateau
    pub stability_threshold: i64,
    /// Number of recent readings kept for plateau detection
    pub history_size: usize,
    /// Ascending step table mapping readings to intensity levels
    pub intensity_steps: Vec<IntensityStep>,
    /// Level for readings at or above the last step
    pub intensity_max_level: u32,
}

impl Default for SensorTriggerConfig {
    fn default() -> Self {
        Self {
            change_threshold: DEFAULT_SENSOR_CHANGE_THRESHOLD,
            stability_threshold: DEFAULT_SENSOR_STABILITY_THRESHOLD,
            history_size: DEFAULT_SENSOR_HISTORY,
            intensity_steps: vec![
                IntensityStep { below: 30, level: 2 },
                IntensityStep { below: 50, level: 3 },
                IntensityStep { below: 85, level: 5 },
            ],
            intensity_max_level: 6,
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub image: ImageTriggerConfig,
    pub sensor: SensorTriggerConfig,
}

impl EngineConfig {
    /// Check invariants the detection layer relies on.
    pub fn validate(&self) -> Result<(), VigilError> {
        let weight_sum = self.image.weights.sum();
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(VigilError::InvalidConfig(format!(
                "score weights must sum to 1.0, got {weight_sum}"
            )));
        }
        if self.image.min_send_interval_secs <= 0.0 {
            return Err(VigilError::InvalidConfig(
                "min_send_interval_secs must be positive".to_string(),
            ));
        }
        if self.image.stability_window == 0 {
            return Err(VigilError::InvalidConfig(
                "stability_window must be at least 1".to_string(),
            ));
        }
        if self.image.stable_checks_required == 0 {
            return Err(VigilError::InvalidConfig(
                "stable_checks_required must be at least 1".to_string(),
            ));
        }
        if self.sensor.history_size < 2 {
            return Err(VigilError::InvalidConfig(
                "sensor history_size must be at least 2".to_string(),
            ));
        }
        if !self
            .sensor
            .intensity_steps
            .windows(2)
            .all(|pair| pair[0].below < pair[1].below)
        {
            return Err(VigilError::InvalidConfig(
                "intensity_steps must be strictly ascending".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((ScoreWeights::default().sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unbalanced_weights_rejected() {
        let mut config = EngineConfig::default();
        config.image.weights.brightness = 0.9;
        assert!(matches!(
            config.validate(),
            Err(VigilError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unsorted_steps_rejected() {
        let mut config = EngineConfig::default();
        config.sensor.intensity_steps.reverse();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let loaded: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, loaded);
    }
}
