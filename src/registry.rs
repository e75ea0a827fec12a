//! Creation, destruction, and lifetime tracking of simulated bodies.
//!
//! The registry is the only component that destroys bodies. Every native
//! resource it creates is released exactly once: descriptors are plain
//! values until insertion, capacity and parameters are validated before any
//! insertion happens, and destruction goes through generation-checked
//! handles so double-teardown during shutdown is a no-op.

use glam::Vec3;
use log::debug;
use rapier3d::prelude::*;

use crate::body::{MotionCategory, RigidBodyDesc, SoftBodyParams};
use crate::config::{
    EngineConfig, MIN_COMPLIANCE, SOFT_DAMPING_RATIO, SOFT_PARTICLE_DAMPING, SOFT_PARTICLE_MASS,
    SOFT_PARTICLE_RADIUS_FRACTION,
};
use crate::error::BridgeError;
use crate::filter::{CollisionFilter, CollisionLayer};
use crate::geometry::SoftBodyMesh;
use crate::utils::arena::{Arena, BodyHandle};
use crate::utils::math;

/// What the registry knows about one live body.
pub(crate) enum BodyRecord {
    Rigid(RigidRecord),
    Soft(SoftRecord),
}

pub(crate) struct RigidRecord {
    pub(crate) rb: RigidBodyHandle,
    pub(crate) motion: MotionCategory,
}

/// Per-vertex layout captured at creation: one particle per mesh vertex, in
/// mesh index order. Re-derived for every body, never assumed stable across
/// engine versions.
pub(crate) struct SoftRecord {
    pub(crate) particles: Vec<RigidBodyHandle>,
    pub(crate) faces: Vec<[u32; 3]>,
    pub(crate) pressure: f32,
}

/// Borrowed view of the world's native sets handed to registry operations.
pub(crate) struct NativeSets<'a> {
    pub bodies: &'a mut RigidBodySet,
    pub colliders: &'a mut ColliderSet,
    pub islands: &'a mut IslandManager,
    pub impulse_joints: &'a mut ImpulseJointSet,
    pub multibody_joints: &'a mut MultibodyJointSet,
}

#[derive(Default)]
pub(crate) struct BodyRegistry {
    records: Arena<BodyRecord>,
    native_bodies: usize,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical bodies currently tracked.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&BodyRecord> {
        self.records.get(handle)
    }

    pub fn create_rigid(
        &mut self,
        desc: &RigidBodyDesc,
        filter: &CollisionFilter,
        config: &EngineConfig,
        sets: &mut NativeSets<'_>,
    ) -> Result<BodyHandle, BridgeError> {
        desc.validate()?;
        // The shape is a plain value until a body consumes it, so nothing
        // needs releasing if a later check fails.
        let shape = desc.shape.build()?;
        if self.native_bodies + 1 > config.max_bodies {
            return Err(BridgeError::CapacityExceeded {
                limit: config.max_bodies,
                requested: self.native_bodies + 1,
            });
        }

        let layer = match desc.motion {
            MotionCategory::Static => CollisionLayer::STATIC,
            MotionCategory::Dynamic | MotionCategory::Kinematic => CollisionLayer::DYNAMIC,
        };
        let builder = match desc.motion {
            MotionCategory::Static => RigidBodyBuilder::fixed(),
            MotionCategory::Dynamic => RigidBodyBuilder::dynamic(),
            MotionCategory::Kinematic => RigidBodyBuilder::kinematic_position_based(),
        };
        let rb = builder.pose(math::to_isometry(desc.position, desc.orientation)).build();
        let rb_handle = sets.bodies.insert(rb);

        let collider = ColliderBuilder::new(shape)
            .friction(desc.friction)
            .restitution(desc.restitution)
            .collision_groups(filter.interaction_groups(layer))
            .build();
        sets.colliders.insert_with_parent(collider, rb_handle, sets.bodies);

        self.native_bodies += 1;
        let handle = self
            .records
            .insert(BodyRecord::Rigid(RigidRecord { rb: rb_handle, motion: desc.motion }));
        debug!("rigid body created: {handle:?} ({:?})", desc.motion);
        Ok(handle)
    }

    pub fn create_soft(
        &mut self,
        mesh: &SoftBodyMesh,
        params: &SoftBodyParams,
        filter: &CollisionFilter,
        config: &EngineConfig,
        sets: &mut NativeSets<'_>,
    ) -> Result<BodyHandle, BridgeError> {
        params.validate()?;
        let count = mesh.vertex_count();
        if self.native_bodies + count > config.max_bodies {
            return Err(BridgeError::CapacityExceeded {
                limit: config.max_bodies,
                requested: self.native_bodies + count,
            });
        }

        let radius = (mesh.shortest_rest_edge() * SOFT_PARTICLE_RADIUS_FRACTION).clamp(1.0e-3, 0.5);
        let groups = filter.interaction_groups(CollisionLayer::DYNAMIC);

        let mut particles = Vec::with_capacity(count);
        for &vertex in mesh.positions() {
            let rb = RigidBodyBuilder::dynamic()
                .translation(math::to_vector(params.position + vertex))
                .lock_rotations()
                .additional_mass(SOFT_PARTICLE_MASS)
                .linear_damping(SOFT_PARTICLE_DAMPING)
                .build();
            let rb_handle = sets.bodies.insert(rb);
            let collider = ColliderBuilder::ball(radius)
                .density(0.0)
                .friction(params.friction)
                .restitution(params.restitution)
                .collision_groups(groups)
                .build();
            sets.colliders.insert_with_parent(collider, rb_handle, sets.bodies);
            particles.push(rb_handle);
        }

        for constraint in mesh.constraints() {
            let stiffness = 1.0 / constraint.compliance.max(MIN_COMPLIANCE);
            let damping = SOFT_DAMPING_RATIO * 2.0 * (stiffness * SOFT_PARTICLE_MASS).sqrt();
            let joint = SpringJointBuilder::new(constraint.rest_length, stiffness, damping).build();
            sets.impulse_joints.insert(
                particles[constraint.a as usize],
                particles[constraint.b as usize],
                joint,
                true,
            );
        }

        self.native_bodies += count;
        let handle = self.records.insert(BodyRecord::Soft(SoftRecord {
            particles,
            faces: mesh.faces().to_vec(),
            pressure: params.pressure,
        }));
        debug!(
            "soft body created: {handle:?} ({count} vertices, {} constraints)",
            mesh.constraints().len()
        );
        Ok(handle)
    }

    /// Removes the body from the world, then releases its native resources.
    /// Idempotent: a dead or stale handle is a no-op and returns `false`.
    pub fn destroy(&mut self, handle: BodyHandle, sets: &mut NativeSets<'_>) -> bool {
        let Some(record) = self.records.remove(handle) else {
            return false;
        };
        match record {
            BodyRecord::Rigid(rigid) => {
                sets.bodies.remove(
                    rigid.rb,
                    sets.islands,
                    sets.colliders,
                    sets.impulse_joints,
                    sets.multibody_joints,
                    true,
                );
                self.native_bodies -= 1;
            }
            BodyRecord::Soft(soft) => {
                for particle in &soft.particles {
                    sets.bodies.remove(
                        *particle,
                        sets.islands,
                        sets.colliders,
                        sets.impulse_joints,
                        sets.multibody_joints,
                        true,
                    );
                }
                self.native_bodies -= soft.particles.len();
            }
        }
        debug!("body destroyed: {handle:?}");
        true
    }

    /// Session teardown: destroys every tracked body without leaking.
    pub fn destroy_all(&mut self, sets: &mut NativeSets<'_>) {
        let handles: Vec<_> = self.records.ids().collect();
        for handle in handles {
            self.destroy(handle, sets);
        }
    }

    /// Applies the pressure model before a substep: each face pushes its
    /// vertices along the face normal with force P·A, where P scales with
    /// the inverse of the current enclosed volume.
    pub fn apply_pressure(&self, bodies: &mut RigidBodySet) {
        for record in self.records.iter() {
            let BodyRecord::Soft(soft) = record else {
                continue;
            };
            if soft.pressure <= 0.0 {
                continue;
            }

            let positions: Vec<Vec3> = soft
                .particles
                .iter()
                .map(|p| bodies.get(*p).map(|rb| math::from_vector(rb.translation())).unwrap_or(Vec3::ZERO))
                .collect();

            let volume: f32 = soft
                .faces
                .iter()
                .map(|&[i0, i1, i2]| {
                    positions[i0 as usize]
                        .dot(positions[i1 as usize].cross(positions[i2 as usize]))
                        / 6.0
                })
                .sum();
            let pressure_over_volume = soft.pressure / volume.abs().max(1.0e-6);

            let mut forces = vec![Vec3::ZERO; positions.len()];
            for &[i0, i1, i2] in &soft.faces {
                let p0 = positions[i0 as usize];
                // 2·area·normal, split evenly over the face's vertices.
                let doubled_area_normal = (positions[i1 as usize] - p0)
                    .cross(positions[i2 as usize] - p0);
                let face_force = doubled_area_normal * (pressure_over_volume * 0.5 / 3.0);
                forces[i0 as usize] += face_force;
                forces[i1 as usize] += face_force;
                forces[i2 as usize] += face_force;
            }

            for (particle, force) in soft.particles.iter().zip(forces) {
                if let Some(rb) = bodies.get_mut(*particle) {
                    rb.reset_forces(true);
                    rb.add_force(math::to_vector(force), true);
                }
            }
        }
    }
}
