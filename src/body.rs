//! Declarative body descriptions consumed at creation time.

use glam::{Quat, Vec3};
use rapier3d::prelude::SharedShape;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::utils::math;

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MotionCategory {
    /// Never moves; collides with dynamic bodies.
    Static,
    /// Fully simulated.
    #[default]
    Dynamic,
    /// Externally driven; collides but ignores forces.
    Kinematic,
}

/// Collider geometry with explicit dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    /// Box given as half extents, with an optional convex radius rounding
    /// its edges (0 for sharp edges).
    Box { half_extents: Vec3, convex_radius: f32 },
    Sphere { radius: f32 },
    /// Y-aligned capsule.
    Capsule { half_height: f32, radius: f32 },
    /// Y-aligned cylinder.
    Cylinder { half_height: f32, radius: f32 },
    /// Convex hull of an arbitrary point cloud.
    ConvexHull { points: Vec<Vec3> },
    /// Triangle mesh, intended for static scene geometry.
    TriMesh { vertices: Vec<Vec3>, indices: Vec<[u32; 3]> },
}

impl Shape {
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Box { half_extents, convex_radius: 0.0 }
    }

    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Builds the engine-native shape. The returned value is a plain
    /// description until a body consumes it, so failing here leaves no
    /// native state behind.
    pub(crate) fn build(&self) -> Result<SharedShape, BridgeError> {
        match self {
            Self::Box { half_extents, convex_radius } => {
                let h = *half_extents;
                if !h.is_finite() || h.min_element() <= 0.0 {
                    return Err(BridgeError::ShapeConstruction(format!(
                        "box half extents must be positive, got {h:?}"
                    )));
                }
                if !convex_radius.is_finite() || *convex_radius < 0.0 {
                    return Err(BridgeError::ShapeConstruction(format!(
                        "convex radius must be non-negative, got {convex_radius}"
                    )));
                }
                if *convex_radius >= h.min_element() {
                    return Err(BridgeError::ShapeConstruction(format!(
                        "convex radius {convex_radius} exceeds smallest half extent {}",
                        h.min_element()
                    )));
                }
                if *convex_radius > 0.0 {
                    Ok(SharedShape::round_cuboid(h.x, h.y, h.z, *convex_radius))
                } else {
                    Ok(SharedShape::cuboid(h.x, h.y, h.z))
                }
            }
            Self::Sphere { radius } => {
                positive("sphere radius", *radius)?;
                Ok(SharedShape::ball(*radius))
            }
            Self::Capsule { half_height, radius } => {
                positive("capsule half height", *half_height)?;
                positive("capsule radius", *radius)?;
                Ok(SharedShape::capsule_y(*half_height, *radius))
            }
            Self::Cylinder { half_height, radius } => {
                positive("cylinder half height", *half_height)?;
                positive("cylinder radius", *radius)?;
                Ok(SharedShape::cylinder(*half_height, *radius))
            }
            Self::ConvexHull { points } => {
                if points.len() < 4 {
                    return Err(BridgeError::ShapeConstruction(format!(
                        "convex hull needs at least 4 points, got {}",
                        points.len()
                    )));
                }
                let native: Vec<_> = points.iter().map(|&p| math::to_point(p)).collect();
                SharedShape::convex_hull(&native).ok_or_else(|| {
                    BridgeError::ShapeConstruction("degenerate convex hull".into())
                })
            }
            Self::TriMesh { vertices, indices } => {
                if vertices.is_empty() || indices.is_empty() {
                    return Err(BridgeError::ShapeConstruction("empty triangle mesh".into()));
                }
                let count = vertices.len() as u32;
                if indices.iter().flatten().any(|&i| i >= count) {
                    return Err(BridgeError::ShapeConstruction(
                        "triangle mesh index out of range".into(),
                    ));
                }
                let native: Vec<_> = vertices.iter().map(|&p| math::to_point(p)).collect();
                SharedShape::trimesh(native, indices.clone())
                    .map_err(|err| BridgeError::ShapeConstruction(err.to_string()))
            }
        }
    }
}

/// Everything needed to construct one rigid body. Consumed by
/// [`World::create_rigid_body`](crate::World::create_rigid_body) and not
/// retained afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBodyDesc {
    pub shape: Shape,
    pub motion: MotionCategory,
    pub position: Vec3,
    pub orientation: Quat,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            shape: Shape::cuboid(Vec3::splat(0.5)),
            motion: MotionCategory::Dynamic,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            friction: 0.5,
            restitution: 0.0,
        }
    }
}

impl RigidBodyDesc {
    pub fn new(shape: Shape) -> Self {
        Self { shape, ..Self::default() }
    }

    pub fn with_motion(mut self, motion: MotionCategory) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), BridgeError> {
        if !self.friction.is_finite() || self.friction < 0.0 {
            return Err(BridgeError::InvalidParameter { name: "friction", value: self.friction });
        }
        if !self.restitution.is_finite() || !(0.0..=1.0).contains(&self.restitution) {
            return Err(BridgeError::InvalidParameter {
                name: "restitution",
                value: self.restitution,
            });
        }
        if !self.position.is_finite() {
            return Err(BridgeError::InvalidParameter { name: "position", value: f32::NAN });
        }
        if !self.orientation.is_finite() {
            return Err(BridgeError::InvalidParameter { name: "orientation", value: f32::NAN });
        }
        Ok(())
    }
}

/// Per-body parameters for soft-body creation. Consumed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftBodyParams {
    /// Internal pressure driving the mesh toward inflation. Zero for cloth.
    pub pressure: f32,
    pub friction: f32,
    pub restitution: f32,
    /// World-space offset applied to every mesh vertex at creation.
    pub position: Vec3,
}

impl Default for SoftBodyParams {
    fn default() -> Self {
        Self { pressure: 0.0, friction: 0.5, restitution: 0.0, position: Vec3::ZERO }
    }
}

impl SoftBodyParams {
    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), BridgeError> {
        if !self.pressure.is_finite() || self.pressure < 0.0 {
            return Err(BridgeError::InvalidParameter { name: "pressure", value: self.pressure });
        }
        if !self.friction.is_finite() || self.friction < 0.0 {
            return Err(BridgeError::InvalidParameter { name: "friction", value: self.friction });
        }
        if !self.restitution.is_finite() || !(0.0..=1.0).contains(&self.restitution) {
            return Err(BridgeError::InvalidParameter {
                name: "restitution",
                value: self.restitution,
            });
        }
        if !self.position.is_finite() {
            return Err(BridgeError::InvalidParameter { name: "position", value: f32::NAN });
        }
        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<(), BridgeError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BridgeError::ShapeConstruction(format!("{name} must be positive, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_dimensions_fail_shape_construction() {
        assert!(matches!(
            Shape::cuboid(Vec3::ZERO).build(),
            Err(BridgeError::ShapeConstruction(_))
        ));
        assert!(matches!(
            Shape::sphere(-1.0).build(),
            Err(BridgeError::ShapeConstruction(_))
        ));
        assert!(matches!(
            Shape::Box { half_extents: Vec3::ONE, convex_radius: 2.0 }.build(),
            Err(BridgeError::ShapeConstruction(_))
        ));
    }

    #[test]
    fn valid_primitives_build() {
        assert!(Shape::cuboid(Vec3::ONE).build().is_ok());
        assert!(Shape::sphere(0.5).build().is_ok());
        assert!(Shape::Box { half_extents: Vec3::ONE, convex_radius: 0.05 }.build().is_ok());
        assert!(Shape::Capsule { half_height: 0.5, radius: 0.2 }.build().is_ok());
    }

    #[test]
    fn descriptor_rejects_out_of_range_parameters() {
        let desc = RigidBodyDesc::default().with_friction(-0.1);
        assert!(matches!(
            desc.validate(),
            Err(BridgeError::InvalidParameter { name: "friction", .. })
        ));

        let desc = RigidBodyDesc::default().with_restitution(1.5);
        assert!(matches!(
            desc.validate(),
            Err(BridgeError::InvalidParameter { name: "restitution", .. })
        ));
    }
}
