//! Per-tick republication of simulated transforms into renderable nodes.
//!
//! Every read here is a snapshot of the latest completed step. Call from the
//! thread that owns the render tick, after [`World::step`] has returned for
//! that tick; reads concurrent with a step are prevented by the borrow on
//! [`World`].

use glam::{Quat, Vec3};

use crate::registry::BodyRecord;
use crate::utils::arena::BodyHandle;
use crate::utils::math;
use crate::world::World;

/// A renderable node with a settable pose.
pub trait RigidTarget {
    fn set_pose(&mut self, position: Vec3, orientation: Quat);
}

/// A renderable mesh with a fixed-length mutable vertex buffer.
pub trait SoftTarget {
    fn vertex_positions_mut(&mut self) -> &mut [Vec3];
    /// Invoked once per sync, after positions have been rewritten.
    fn mark_normals_dirty(&mut self);
}

impl World {
    /// Current pose of a rigid body. Allocation-free. `None` for dead
    /// handles and soft bodies.
    pub fn rigid_pose(&self, handle: BodyHandle) -> Option<(Vec3, Quat)> {
        match self.registry.get(handle)? {
            BodyRecord::Rigid(rigid) => {
                let rb = self.bodies.get(rigid.rb)?;
                Some((math::from_vector(rb.translation()), math::from_unit_quat(rb.rotation())))
            }
            BodyRecord::Soft(_) => None,
        }
    }

    /// Linear velocity of a rigid body, for diagnostics and rest detection.
    pub fn rigid_linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        match self.registry.get(handle)? {
            BodyRecord::Rigid(rigid) => {
                let rb = self.bodies.get(rigid.rb)?;
                Some(math::from_vector(rb.linvel()))
            }
            BodyRecord::Soft(_) => None,
        }
    }

    /// Number of vertices captured at soft-body creation. Fixed for the
    /// body's lifetime.
    pub fn soft_vertex_count(&self, handle: BodyHandle) -> Option<usize> {
        match self.registry.get(handle)? {
            BodyRecord::Soft(soft) => Some(soft.particles.len()),
            BodyRecord::Rigid(_) => None,
        }
    }

    /// Deformed positions of a soft body, one entry per live vertex in
    /// stable index order. Finite and restartable: each call walks the
    /// latest completed step again.
    pub fn soft_vertex_positions(
        &self,
        handle: BodyHandle,
    ) -> Option<impl Iterator<Item = (usize, Vec3)> + '_> {
        let BodyRecord::Soft(soft) = self.registry.get(handle)? else {
            return None;
        };
        Some(soft.particles.iter().enumerate().map(move |(index, particle)| {
            let position = self
                .bodies
                .get(*particle)
                .map(|rb| math::from_vector(rb.translation()))
                .unwrap_or(Vec3::ZERO);
            (index, position)
        }))
    }
}

/// Publishes a rigid body's pose into `target`. Returns `false` for dead
/// handles.
pub fn sync_rigid<T: RigidTarget>(world: &World, handle: BodyHandle, target: &mut T) -> bool {
    match world.rigid_pose(handle) {
        Some((position, orientation)) => {
            target.set_pose(position, orientation);
            true
        }
        None => false,
    }
}

/// Publishes a soft body's deformed vertices into `target`'s buffer and
/// marks normals dirty. Refuses — returns `false` — when the buffer length
/// does not match the body's vertex count.
pub fn sync_soft<T: SoftTarget>(world: &World, handle: BodyHandle, target: &mut T) -> bool {
    let Some(count) = world.soft_vertex_count(handle) else {
        return false;
    };
    {
        let buffer = target.vertex_positions_mut();
        if buffer.len() != count {
            return false;
        }
        let Some(positions) = world.soft_vertex_positions(handle) else {
            return false;
        };
        for (index, position) in positions {
            buffer[index] = position;
        }
    }
    target.mark_normals_dirty();
    true
}
