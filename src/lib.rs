//! Vigil - On-device change-and-stability trigger engine
//!
//! Vigil is the decision layer of an installation that continuously samples
//! a camera stream and a GSR biometric stream and must decide, cheaply and
//! locally, when conditions justify an expensive, rate-limited external
//! scene-analysis call. Frames flow through feature extraction, difference
//! scoring, and a stability window into the image trigger controller; GSR
//! readings flow through a parallel sensor controller whose stabilization
//! events pre-empt the image cadence via a shared coordinator.
//!
//! ## Modules
//!
//! - **features / score / stability**: reduce frames to compact summaries
//!   and decide how different and how settled the scene is
//! - **image_trigger / sensor_trigger**: the two hysteresis state machines
//! - **coordinator**: the only state shared between sampling loops
//! - **dispatch**: bounded background queue keeping slow external calls off
//!   the sampling loops
//! - **pipeline**: the `TriggerEngine` façade tying it together

pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod features;
pub mod frame;
pub mod image_trigger;
pub mod pipeline;
pub mod score;
pub mod sensor_trigger;
pub mod stability;
pub mod types;

pub use config::{EngineConfig, ImageTriggerConfig, ScoreWeights, SensorTriggerConfig};
pub use coordinator::TriggerCoordinator;
pub use dispatch::Dispatcher;
pub use error::VigilError;
pub use frame::Frame;
pub use pipeline::{TickReport, TriggerEngine};
pub use types::{FeatureSummary, SendDecision, SendReason, SensorReading, SensorUpdate, TriggerEvent};

/// Vigil version embedded in emitted status output
pub const VIGIL_VERSION: &str = env!("CARGO_PKG_VERSION");
