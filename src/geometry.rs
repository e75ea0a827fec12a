//! Conversion between renderable mesh geometry and the engine's per-vertex
//! soft-body description.
//!
//! Called once per soft body at creation time. The derived constraint set
//! uses one compliance for every constraint kind, a deliberate
//! simplification; per-kind compliance would require extending
//! [`MeshConstraint`] rather than changing call sites.

use std::collections::HashMap;

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Two adjacent faces are treated as a planar quad — their cross-diagonal
/// becomes a shear constraint — when their normals agree at least this much.
const SHEAR_COPLANAR_DOT: f32 = 0.999;

const MIN_EDGE_LENGTH: f32 = 1.0e-6;

/// Kind of structural relationship a constraint maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// A face edge keeping two connected vertices at rest distance.
    Edge,
    /// The diagonal of a planar quad formed by two adjacent faces.
    Shear,
    /// The cross-edge pair of two adjacent, non-coplanar faces.
    Bend,
}

/// Distance constraint between two vertices of a soft-body mesh.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MeshConstraint {
    pub kind: ConstraintKind,
    pub a: u32,
    pub b: u32,
    pub rest_length: f32,
    pub compliance: f32,
}

/// Initial condition and topology of a soft body.
///
/// Vertex count and face topology are fixed for the body's lifetime; only
/// positions change once the body is simulated. The accessors double as the
/// reverse conversion into renderable vertex/index arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftBodyMesh {
    vertices: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
    constraints: Vec<MeshConstraint>,
    rest_volume: f32,
}

impl SoftBodyMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn constraints(&self) -> &[MeshConstraint] {
        &self.constraints
    }

    /// Signed rest volume computed from the initial positions.
    pub fn rest_volume(&self) -> f32 {
        self.rest_volume
    }

    pub(crate) fn shortest_rest_edge(&self) -> f32 {
        self.constraints
            .iter()
            .filter(|c| c.kind == ConstraintKind::Edge)
            .map(|c| c.rest_length)
            .fold(f32::INFINITY, f32::min)
    }
}

/// Builds a soft-body description from renderable geometry.
///
/// When `indices` is absent, every 3 consecutive vertices form one face, so
/// the vertex count must be divisible by 3. Produces one constraint per
/// structural relationship (unique face edges; the opposite-vertex pair of
/// each pair of faces sharing an edge) and computes rest lengths and the
/// rest volume from the supplied initial positions.
pub fn to_soft_body_mesh(
    vertices: &[Vec3],
    indices: Option<&[u32]>,
    compliance: f32,
) -> Result<SoftBodyMesh, BridgeError> {
    if !compliance.is_finite() || compliance < 0.0 {
        return Err(BridgeError::InvalidParameter { name: "compliance", value: compliance });
    }
    if vertices.is_empty() {
        return Err(BridgeError::InvalidTopology("mesh has no vertices".into()));
    }
    if vertices.iter().any(|v| !v.is_finite()) {
        return Err(BridgeError::InvalidTopology("non-finite vertex position".into()));
    }

    let faces = collect_faces(vertices.len(), indices)?;
    let constraints = derive_constraints(vertices, &faces, compliance)?;
    let rest_volume = signed_volume(vertices, &faces);

    debug!(
        "soft mesh built: {} vertices, {} faces, {} constraints",
        vertices.len(),
        faces.len(),
        constraints.len()
    );

    Ok(SoftBodyMesh { vertices: vertices.to_vec(), faces, constraints, rest_volume })
}

fn collect_faces(vertex_count: usize, indices: Option<&[u32]>) -> Result<Vec<[u32; 3]>, BridgeError> {
    let faces: Vec<[u32; 3]> = match indices {
        Some(indices) => {
            if indices.len() % 3 != 0 {
                return Err(BridgeError::InvalidTopology(format!(
                    "index count {} is not divisible by 3",
                    indices.len()
                )));
            }
            if indices.iter().any(|&i| i as usize >= vertex_count) {
                return Err(BridgeError::InvalidTopology("face index out of range".into()));
            }
            indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
        }
        None => {
            if vertex_count % 3 != 0 {
                return Err(BridgeError::InvalidTopology(format!(
                    "vertex count {vertex_count} is not divisible by 3 and no indices were supplied"
                )));
            }
            (0..vertex_count as u32).step_by(3).map(|i| [i, i + 1, i + 2]).collect()
        }
    };

    for face in &faces {
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(BridgeError::InvalidTopology(format!(
                "face {face:?} repeats a vertex"
            )));
        }
    }
    Ok(faces)
}

fn derive_constraints(
    vertices: &[Vec3],
    faces: &[[u32; 3]],
    compliance: f32,
) -> Result<Vec<MeshConstraint>, BridgeError> {
    // For each undirected edge: the faces incident to it, with the vertex
    // opposite the edge and the face normal.
    let mut edge_faces: HashMap<(u32, u32), Vec<(u32, Vec3)>> = HashMap::new();
    for face in faces {
        let [i0, i1, i2] = *face;
        let normal = (vertices[i1 as usize] - vertices[i0 as usize])
            .cross(vertices[i2 as usize] - vertices[i0 as usize])
            .normalize_or_zero();
        for (a, b, opposite) in [(i0, i1, i2), (i1, i2, i0), (i2, i0, i1)] {
            let key = (a.min(b), a.max(b));
            edge_faces.entry(key).or_default().push((opposite, normal));
        }
    }

    let mut constraints = Vec::with_capacity(edge_faces.len() * 2);
    let mut seen: std::collections::HashSet<(u32, u32)> = std::collections::HashSet::new();

    let mut push = |kind: ConstraintKind, a: u32, b: u32, out: &mut Vec<MeshConstraint>| {
        let key = (a.min(b), a.max(b));
        if !seen.insert(key) {
            return Ok(());
        }
        let rest_length = vertices[a as usize].distance(vertices[b as usize]);
        if rest_length < MIN_EDGE_LENGTH {
            return Err(BridgeError::InvalidTopology(format!(
                "vertices {a} and {b} are coincident"
            )));
        }
        out.push(MeshConstraint { kind, a: key.0, b: key.1, rest_length, compliance });
        Ok(())
    };

    // Structural edges first so shortest_rest_edge and counts are stable.
    let mut keys: Vec<_> = edge_faces.keys().copied().collect();
    keys.sort_unstable();
    for &(a, b) in &keys {
        push(ConstraintKind::Edge, a, b, &mut constraints)?;
    }
    for &key in &keys {
        let incident = &edge_faces[&key];
        if incident.len() != 2 {
            continue;
        }
        let (opp_a, normal_a) = incident[0];
        let (opp_b, normal_b) = incident[1];
        if opp_a == opp_b {
            continue;
        }
        let kind = if normal_a.dot(normal_b).abs() >= SHEAR_COPLANAR_DOT {
            ConstraintKind::Shear
        } else {
            ConstraintKind::Bend
        };
        push(kind, opp_a, opp_b, &mut constraints)?;
    }

    Ok(constraints)
}

fn signed_volume(vertices: &[Vec3], faces: &[[u32; 3]]) -> f32 {
    faces
        .iter()
        .map(|&[i0, i1, i2]| {
            let v0 = vertices[i0 as usize];
            let v1 = vertices[i1 as usize];
            let v2 = vertices[i2 as usize];
            v0.dot(v1.cross(v2)) / 6.0
        })
        .sum()
}

/// Procedurally generates a watertight UV sphere suitable for pressurized
/// soft bodies. Returns vertices and triangle indices: the two poles first,
/// then `num_theta - 2` interior rings of `num_phi` vertices.
pub fn uv_sphere(radius: f32, num_theta: usize, num_phi: usize) -> (Vec<Vec3>, Vec<u32>) {
    use std::f32::consts::PI;

    let num_theta = num_theta.max(3);
    let num_phi = num_phi.max(3);

    let spherical = |polar: f32, azimuth: f32| {
        Vec3::new(
            radius * polar.sin() * azimuth.sin(),
            radius * polar.cos(),
            radius * polar.sin() * azimuth.cos(),
        )
    };

    let mut vertices = Vec::with_capacity(2 + (num_theta - 2) * num_phi);
    vertices.push(spherical(0.0, 0.0));
    vertices.push(spherical(PI, 0.0));
    for theta in 1..num_theta - 1 {
        for phi in 0..num_phi {
            vertices.push(spherical(
                PI * theta as f32 / (num_theta - 1) as f32,
                2.0 * PI * phi as f32 / num_phi as f32,
            ));
        }
    }

    let vertex_index = |theta: usize, phi: usize| -> u32 {
        if theta == 0 {
            0
        } else if theta == num_theta - 1 {
            1
        } else {
            (2 + (theta - 1) * num_phi + (phi % num_phi)) as u32
        }
    };

    let mut indices = Vec::new();
    for phi in 0..num_phi {
        for theta in 0..num_theta - 2 {
            indices.extend([
                vertex_index(theta, phi),
                vertex_index(theta + 1, phi),
                vertex_index(theta + 1, phi + 1),
            ]);
            if theta > 0 {
                indices.extend([
                    vertex_index(theta, phi),
                    vertex_index(theta + 1, phi + 1),
                    vertex_index(theta, phi + 1),
                ]);
            }
        }
        indices.extend([
            vertex_index(num_theta - 2, phi + 1),
            vertex_index(num_theta - 2, phi),
            vertex_index(num_theta - 1, 0),
        ]);
    }

    (vertices, indices)
}
