//! Conversions between the public `glam` math types and the engine's
//! `nalgebra` types.

use glam::{Quat, Vec3};
use rapier3d::na::{Point3, Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::{Isometry, Real, Vector};

pub(crate) fn to_vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

pub(crate) fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub(crate) fn to_point(v: Vec3) -> Point3<Real> {
    Point3::new(v.x, v.y, v.z)
}

pub(crate) fn to_unit_quat(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

pub(crate) fn from_unit_quat(q: &UnitQuaternion<Real>) -> Quat {
    // nalgebra stores quaternion coords as [i, j, k, w].
    Quat::from_xyzw(q.coords[0], q.coords[1], q.coords[2], q.coords[3])
}

pub(crate) fn to_isometry(position: Vec3, orientation: Quat) -> Isometry<Real> {
    Isometry::from_parts(Translation3::from(to_vector(position)), to_unit_quat(orientation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quaternion_round_trips() {
        let q = Quat::from_xyzw(0.1, 0.2, 0.3, 0.4).normalize();
        let back = from_unit_quat(&to_unit_quat(q));
        assert!((q.x - back.x).abs() < 1.0e-6);
        assert!((q.y - back.y).abs() < 1.0e-6);
        assert!((q.z - back.z).abs() < 1.0e-6);
        assert!((q.w - back.w).abs() < 1.0e-6);
    }
}
