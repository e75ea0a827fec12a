//! Engine configuration and simulation tuning constants.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Upper bound on the wall-clock delta consumed by one step (seconds).
/// Larger deltas are clamped so a stalled frame cannot trigger runaway
/// integration on the next tick.
pub const MAX_STEP_SECONDS: f32 = 1.0 / 30.0;

/// Clamped deltas above this threshold are integrated in two substeps.
pub const SINGLE_SUBSTEP_MAX_SECONDS: f32 = 1.0 / 55.0;

/// Default gravity vector applied in the physics world (Y-up).
pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, -9.81, 0.0];

/// Mass assigned to each soft-body vertex particle (kg).
pub const SOFT_PARTICLE_MASS: f32 = 0.1;

/// Collision radius of a vertex particle, as a fraction of the shortest
/// rest edge of its mesh.
pub const SOFT_PARTICLE_RADIUS_FRACTION: f32 = 0.25;

/// Linear damping applied to soft-body vertex particles.
pub const SOFT_PARTICLE_DAMPING: f32 = 0.2;

/// Floor for constraint compliance when converting to spring stiffness.
pub const MIN_COMPLIANCE: f32 = 1.0e-8;

/// Fraction of critical damping applied to soft-body constraints.
pub const SOFT_DAMPING_RATIO: f32 = 1.0;

const MAX_WORKER_THREADS: usize = 128;

/// Settings applied once per engine acquisition.
///
/// `max_bodies` is enforced by the body registry (soft-body vertex particles
/// count against it). `max_body_pairs`, `max_contact_constraints`, and
/// `scratch_allocator_bytes` are forwarded to backends that size themselves
/// from static tables; undersizing the scratch allocator causes step failures
/// under complex scenes, so treat it as a tuning knob, not a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Worker threads used internally during one step. 0 runs everything on
    /// the calling thread. Keep this below the machine's core count so the
    /// render thread is not starved.
    pub worker_threads: usize,
    /// Hard cap on live engine-native bodies.
    pub max_bodies: usize,
    /// Cap on broad-phase body pairs considered per step.
    pub max_body_pairs: usize,
    /// Cap on simultaneous contact constraints.
    pub max_contact_constraints: usize,
    /// Scratch space reserved for transient per-step computation.
    pub scratch_allocator_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: 3,
            max_bodies: 4096,
            max_body_pairs: 4096,
            max_contact_constraints: 4096,
            scratch_allocator_bytes: 64 * 1024 * 1024,
        }
    }
}

impl EngineConfig {
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    pub fn with_max_bodies(mut self, max_bodies: usize) -> Self {
        self.max_bodies = max_bodies;
        self
    }

    pub fn with_max_body_pairs(mut self, max_body_pairs: usize) -> Self {
        self.max_body_pairs = max_body_pairs;
        self
    }

    pub fn with_max_contact_constraints(mut self, max_contact_constraints: usize) -> Self {
        self.max_contact_constraints = max_contact_constraints;
        self
    }

    pub fn with_scratch_allocator_bytes(mut self, scratch_allocator_bytes: usize) -> Self {
        self.scratch_allocator_bytes = scratch_allocator_bytes;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), BridgeError> {
        if self.worker_threads > MAX_WORKER_THREADS {
            return Err(BridgeError::EngineInit(format!(
                "worker_threads must be at most {MAX_WORKER_THREADS}, got {}",
                self.worker_threads
            )));
        }
        if self.max_bodies == 0 {
            return Err(BridgeError::EngineInit("max_bodies must be non-zero".into()));
        }
        if self.max_body_pairs == 0 {
            return Err(BridgeError::EngineInit("max_body_pairs must be non-zero".into()));
        }
        if self.max_contact_constraints == 0 {
            return Err(BridgeError::EngineInit(
                "max_contact_constraints must be non-zero".into(),
            ));
        }
        if self.scratch_allocator_bytes == 0 {
            return Err(BridgeError::EngineInit(
                "scratch_allocator_bytes must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
