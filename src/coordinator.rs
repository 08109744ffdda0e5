//! Cross-controller trigger coordination
//!
//! The only state shared between the sensor loop and the image loop: a
//! one-shot force-trigger flag and the current intensity level. Both are
//! atomics behind a cheaply clonable handle, so neither loop ever blocks
//! and no read can observe a torn value.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Initial intensity level before any reading arrives.
pub const DEFAULT_INTENSITY_LEVEL: u32 = 2;

#[derive(Debug)]
struct Shared {
    force_trigger: AtomicBool,
    intensity_level: AtomicU32,
}

/// Shared handle connecting the sensor controller to the image-sampling
/// loop and the downstream parameter consumer.
///
/// Raising the force trigger while a previous raise is still unconsumed
/// coalesces into a single pending trigger; it is a flag, not a queue.
#[derive(Debug, Clone)]
pub struct TriggerCoordinator {
    shared: Arc<Shared>,
}

impl Default for TriggerCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerCoordinator {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                force_trigger: AtomicBool::new(false),
                intensity_level: AtomicU32::new(DEFAULT_INTENSITY_LEVEL),
            }),
        }
    }

    /// Current intensity level, continuously readable by any context.
    pub fn intensity_level(&self) -> u32 {
        self.shared.intensity_level.load(Ordering::Acquire)
    }

    pub fn set_intensity_level(&self, level: u32) {
        self.shared.intensity_level.store(level, Ordering::Release);
    }

    /// Request an out-of-cycle capture. Idempotent while unconsumed.
    pub fn raise_force_trigger(&self) {
        self.shared.force_trigger.store(true, Ordering::Release);
    }

    /// Read and clear the pending trigger in one atomic step. At most one
    /// caller observes `true` per raise burst.
    pub fn consume_force_trigger(&self) -> bool {
        self.shared.force_trigger.swap(false, Ordering::AcqRel)
    }

    /// Non-destructive view of the flag, for status reporting only.
    pub fn force_trigger_pending(&self) -> bool {
        self.shared.force_trigger.load(Ordering::Acquire)
    }

    /// Snapshot for serialization into status output.
    pub fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            intensity_level: self.intensity_level(),
            force_trigger_pending: self.force_trigger_pending(),
        }
    }
}

/// Point-in-time view of the coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorSnapshot {
    pub intensity_level: u32,
    pub force_trigger_pending: bool,
}
