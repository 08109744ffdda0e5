//! Error types for Vigil

use thiserror::Error;

/// Errors that can occur at the crate's input boundaries.
///
/// The detection core itself is total: feature extraction, scoring, and the
/// trigger state machines never fail on well-formed in-memory values. Errors
/// only arise when validating frames, configuration, or serialized readings.
#[derive(Debug, Error)]
pub enum VigilError {
    #[error("invalid frame geometry: {width}x{height} rgb frame needs {expected} bytes, got {actual}")]
    FrameGeometry {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
