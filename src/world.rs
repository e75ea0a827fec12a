//! The simulation world and its stepper.

use glam::{Quat, Vec3};
use log::trace;
use rapier3d::prelude::*;

use crate::body::{MotionCategory, RigidBodyDesc, SoftBodyParams};
use crate::config::{DEFAULT_GRAVITY, MAX_STEP_SECONDS, SINGLE_SUBSTEP_MAX_SECONDS};
use crate::engine::EngineHandle;
use crate::error::BridgeError;
use crate::filter::CollisionFilter;
use crate::geometry::SoftBodyMesh;
use crate::registry::{BodyRecord, BodyRegistry, NativeSets};
use crate::utils::arena::BodyHandle;
use crate::utils::logging::ScopedTimer;
use crate::utils::math;

/// Outcome of one [`World::step`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Wall-clock delta the caller handed in.
    pub requested: f32,
    /// Delta actually integrated, after clamping.
    pub advanced: f32,
    /// Substeps the advance was divided into (0 when nothing advanced).
    pub substeps: u32,
}

/// Simulation state: the engine-native sets, the body registry, and the
/// simulation clock.
///
/// Exclusively owned by one session and not safe for concurrent stepping;
/// mutation, stepping, and sync reads are serialized through `&mut`/`&`
/// access from the thread driving the render tick.
pub struct World {
    engine: EngineHandle,
    filter: CollisionFilter,
    pub(crate) bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    ccd: CCDSolver,
    pipeline: PhysicsPipeline,
    params: IntegrationParameters,
    gravity: Vector<Real>,
    pub(crate) registry: BodyRegistry,
    elapsed: f64,
    ticks: u64,
}

impl World {
    /// Creates a world owning the given collision filter. The engine handle
    /// is retained, keeping the engine alive for as long as the world exists.
    pub fn new(engine: EngineHandle, filter: CollisionFilter) -> Self {
        Self {
            engine,
            filter,
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            ccd: CCDSolver::new(),
            pipeline: PhysicsPipeline::new(),
            params: IntegrationParameters::default(),
            gravity: Vector::from(DEFAULT_GRAVITY),
            registry: BodyRegistry::new(),
            elapsed: 0.0,
            ticks: 0,
        }
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn filter(&self) -> &CollisionFilter {
        &self.filter
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = math::to_vector(gravity);
    }

    /// Simulated seconds accumulated so far.
    pub fn simulation_time(&self) -> f64 {
        self.elapsed
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Logical bodies tracked by the registry.
    pub fn body_count(&self) -> usize {
        self.registry.len()
    }

    /// Engine-native bodies, counting each soft-body vertex particle.
    pub fn native_body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.registry.get(handle).is_some()
    }

    /// Creates a rigid body from a declarative description and inserts it
    /// into the world. Dynamic and kinematic bodies come up active; static
    /// bodies are inert from the start.
    pub fn create_rigid_body(&mut self, desc: &RigidBodyDesc) -> Result<BodyHandle, BridgeError> {
        let config = *self.engine.config();
        let mut sets = NativeSets {
            bodies: &mut self.bodies,
            colliders: &mut self.colliders,
            islands: &mut self.islands,
            impulse_joints: &mut self.impulse_joints,
            multibody_joints: &mut self.multibody_joints,
        };
        self.registry.create_rigid(desc, &self.filter, &config, &mut sets)
    }

    /// Creates a soft body from a mesh description produced by the geometry
    /// bridge. The per-vertex layout is captured now and stays fixed for the
    /// body's lifetime.
    pub fn create_soft_body(
        &mut self,
        mesh: &SoftBodyMesh,
        params: &SoftBodyParams,
    ) -> Result<BodyHandle, BridgeError> {
        let config = *self.engine.config();
        let mut sets = NativeSets {
            bodies: &mut self.bodies,
            colliders: &mut self.colliders,
            islands: &mut self.islands,
            impulse_joints: &mut self.impulse_joints,
            multibody_joints: &mut self.multibody_joints,
        };
        self.registry.create_soft(mesh, params, &self.filter, &config, &mut sets)
    }

    /// Destroys a body. Idempotent: destroying an already-destroyed handle
    /// is a no-op and returns `false`.
    pub fn destroy(&mut self, handle: BodyHandle) -> bool {
        let mut sets = NativeSets {
            bodies: &mut self.bodies,
            colliders: &mut self.colliders,
            islands: &mut self.islands,
            impulse_joints: &mut self.impulse_joints,
            multibody_joints: &mut self.multibody_joints,
        };
        self.registry.destroy(handle, &mut sets)
    }

    /// Destroys every tracked body. Intended for session teardown.
    pub fn destroy_all(&mut self) {
        let mut sets = NativeSets {
            bodies: &mut self.bodies,
            colliders: &mut self.colliders,
            islands: &mut self.islands,
            impulse_joints: &mut self.impulse_joints,
            multibody_joints: &mut self.multibody_joints,
        };
        self.registry.destroy_all(&mut sets);
    }

    /// Sets the pose a kinematic body will be driven to over the next step.
    /// Returns `false` for dead handles and non-kinematic bodies.
    pub fn set_kinematic_target(
        &mut self,
        handle: BodyHandle,
        position: Vec3,
        orientation: Quat,
    ) -> bool {
        let Some(BodyRecord::Rigid(rigid)) = self.registry.get(handle) else {
            return false;
        };
        if rigid.motion != MotionCategory::Kinematic {
            return false;
        }
        let Some(rb) = self.bodies.get_mut(rigid.rb) else {
            return false;
        };
        rb.set_next_kinematic_translation(math::to_vector(position));
        rb.set_next_kinematic_rotation(math::to_unit_quat(orientation));
        true
    }

    /// Advances the simulation by a capped, possibly substepped delta.
    ///
    /// The delta is clamped to 1/30 s; clamped deltas above 1/55 s are
    /// integrated in two substeps. Call at most once per render tick from
    /// the thread owning the world. Blocks until every substep has completed
    /// and all body transforms are stable for reading — no partial-step
    /// state is observable, even when the engine parallelizes internally.
    pub fn step(&mut self, wall_dt: f32) -> Result<StepReport, BridgeError> {
        if !wall_dt.is_finite() || wall_dt <= 0.0 {
            return Ok(StepReport { requested: wall_dt, advanced: 0.0, substeps: 0 });
        }

        let advanced = wall_dt.min(MAX_STEP_SECONDS);
        if advanced < wall_dt {
            trace!("step delta clamped: {wall_dt} -> {advanced}");
        }
        let substeps: u32 = if advanced > SINGLE_SUBSTEP_MAX_SECONDS { 2 } else { 1 };
        self.params.dt = advanced / substeps as f32;

        for _ in 0..substeps {
            let _timer = ScopedTimer::new("world::substep");
            self.registry.apply_pressure(&mut self.bodies);

            let Self {
                engine,
                pipeline,
                islands,
                broad_phase,
                narrow_phase,
                bodies,
                colliders,
                impulse_joints,
                multibody_joints,
                ccd,
                params,
                gravity,
                ..
            } = self;
            engine.run_scoped(|| {
                pipeline.step(
                    &*gravity,
                    &*params,
                    islands,
                    broad_phase,
                    narrow_phase,
                    bodies,
                    colliders,
                    impulse_joints,
                    multibody_joints,
                    ccd,
                    &(),
                    &(),
                );
            });
        }

        self.check_divergence()?;
        self.elapsed += advanced as f64;
        self.ticks += 1;
        Ok(StepReport { requested: wall_dt, advanced, substeps })
    }

    // Step failures are fatal for the session: non-finite state indicates
    // exhausted capacities or an exploding configuration, not a transient.
    fn check_divergence(&self) -> Result<(), BridgeError> {
        for (_, rb) in self.bodies.iter() {
            let t = rb.translation();
            if !(t.x.is_finite() && t.y.is_finite() && t.z.is_finite()) {
                return Err(BridgeError::StepFailed("non-finite body pose after step".into()));
            }
        }
        Ok(())
    }
}
