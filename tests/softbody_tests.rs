use kinesis::*;

const DT: f32 = 1.0 / 60.0;

fn make_world() -> World {
    let engine = EngineHandle::standalone(EngineConfig::default()).expect("engine init");
    World::new(engine, CollisionFilter::default_static_dynamic())
}

fn floor(world: &mut World) {
    world
        .create_rigid_body(
            &RigidBodyDesc::new(Shape::cuboid(Vec3::new(20.0, 1.0, 20.0)))
                .with_motion(MotionCategory::Static)
                .with_position(Vec3::new(0.0, -1.0, 0.0)),
        )
        .expect("floor");
}

#[test]
fn mesh_round_trips_through_the_world() {
    // Two triangles with no shared vertices: topology survives conversion
    // untouched and positions come back exactly at creation time.
    let vertices = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(3.0, 0.0, 0.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(3.0, 1.0, 0.0),
    ];
    let mesh = to_soft_body_mesh(&vertices, None, 1.0e-4).expect("mesh");
    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(mesh.face_count(), 2);
    assert_eq!(mesh.positions(), &vertices[..]);

    let mut world = make_world();
    let body = world
        .create_soft_body(&mesh, &SoftBodyParams::default())
        .expect("soft body");

    assert_eq!(world.soft_vertex_count(body), Some(6));
    let positions: Vec<(usize, Vec3)> =
        world.soft_vertex_positions(body).expect("positions").collect();
    assert_eq!(positions.len(), 6);
    for (index, position) in positions {
        assert!((position - vertices[index]).length() < 1.0e-5);
    }
}

#[test]
fn non_triangle_vertex_count_is_rejected() {
    let vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
    assert!(matches!(
        to_soft_body_mesh(&vertices, None, 1.0e-4),
        Err(BridgeError::InvalidTopology(_))
    ));
}

#[test]
fn negative_pressure_is_rejected_at_creation() {
    let (vertices, indices) = uv_sphere(0.5, 6, 8);
    let mesh = to_soft_body_mesh(&vertices, Some(&indices), 1.0e-4).expect("mesh");

    let mut world = make_world();
    let err = world.create_soft_body(&mesh, &SoftBodyParams::default().with_pressure(-10.0));
    assert!(matches!(
        err,
        Err(BridgeError::InvalidParameter { name: "pressure", .. })
    ));
    assert_eq!(world.body_count(), 0);
    assert_eq!(world.native_body_count(), 0);
}

#[test]
fn vertex_count_and_index_order_are_stable_while_simulating() {
    let (vertices, indices) = uv_sphere(1.0, 6, 8);
    let mesh = to_soft_body_mesh(&vertices, Some(&indices), 1.0e-4).expect("mesh");
    assert_eq!(mesh.vertex_count(), 34);

    let mut world = make_world();
    floor(&mut world);
    let body = world
        .create_soft_body(
            &mesh,
            &SoftBodyParams::default()
                .with_pressure(50.0)
                .with_position(Vec3::new(0.0, 3.0, 0.0)),
        )
        .expect("soft body");

    for _ in 0..60 {
        world.step(DT).expect("step");

        assert_eq!(world.soft_vertex_count(body), Some(34));
        let mut expected = 0;
        for (index, position) in world.soft_vertex_positions(body).expect("positions") {
            assert_eq!(index, expected);
            assert!(position.is_finite());
            expected += 1;
        }
        assert_eq!(expected, 34);
    }
}

#[test]
fn soft_body_destruction_restores_counts() {
    let (vertices, indices) = uv_sphere(0.5, 6, 8);
    let mesh = to_soft_body_mesh(&vertices, Some(&indices), 1.0e-4).expect("mesh");

    let mut world = make_world();
    floor(&mut world);
    let native_before = world.native_body_count();

    let body = world
        .create_soft_body(&mesh, &SoftBodyParams::default())
        .expect("soft body");
    assert_eq!(world.native_body_count(), native_before + 34);

    assert!(world.destroy(body));
    assert!(!world.destroy(body));
    assert_eq!(world.native_body_count(), native_before);
    assert_eq!(world.soft_vertex_count(body), None);
}

#[test]
fn soft_capacity_counts_vertex_particles() {
    let (vertices, indices) = uv_sphere(0.5, 6, 8);
    let mesh = to_soft_body_mesh(&vertices, Some(&indices), 1.0e-4).expect("mesh");

    let engine =
        EngineHandle::standalone(EngineConfig::default().with_max_bodies(10)).expect("engine init");
    let mut world = World::new(engine, CollisionFilter::default_static_dynamic());

    let err = world.create_soft_body(&mesh, &SoftBodyParams::default());
    assert!(matches!(
        err,
        Err(BridgeError::CapacityExceeded { limit: 10, requested: 34 })
    ));
    assert_eq!(world.native_body_count(), 0);
}

struct RecordingMesh {
    buffer: Vec<Vec3>,
    normals_dirty: bool,
}

impl SoftTarget for RecordingMesh {
    fn vertex_positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.buffer
    }

    fn mark_normals_dirty(&mut self) {
        self.normals_dirty = true;
    }
}

#[test]
fn sync_soft_refuses_mismatched_buffers() {
    let (vertices, indices) = uv_sphere(1.0, 6, 8);
    let mesh = to_soft_body_mesh(&vertices, Some(&indices), 1.0e-4).expect("mesh");

    let mut world = make_world();
    let body = world
        .create_soft_body(&mesh, &SoftBodyParams::default())
        .expect("soft body");

    let mut wrong = RecordingMesh { buffer: vec![Vec3::ZERO; 7], normals_dirty: false };
    assert!(!sync_soft(&world, body, &mut wrong));
    assert!(!wrong.normals_dirty);

    let mut right = RecordingMesh { buffer: vec![Vec3::ZERO; 34], normals_dirty: false };
    assert!(sync_soft(&world, body, &mut right));
    assert!(right.normals_dirty);
    assert!(right.buffer.iter().any(|p| *p != Vec3::ZERO));
}

#[test]
fn rigid_accessors_ignore_soft_bodies_and_vice_versa() {
    let (vertices, indices) = uv_sphere(0.5, 6, 8);
    let mesh = to_soft_body_mesh(&vertices, Some(&indices), 1.0e-4).expect("mesh");

    let mut world = make_world();
    let soft = world
        .create_soft_body(&mesh, &SoftBodyParams::default())
        .expect("soft body");
    let rigid = world
        .create_rigid_body(&RigidBodyDesc::default())
        .expect("rigid body");

    assert!(world.rigid_pose(soft).is_none());
    assert!(world.rigid_linear_velocity(soft).is_none());
    assert!(world.soft_vertex_count(rigid).is_none());
    assert!(world.soft_vertex_positions(rigid).is_none());
}

#[test]
fn pressurized_sphere_keeps_its_volume_on_the_floor() {
    let (vertices, indices) = uv_sphere(1.0, 8, 10);
    let mesh = to_soft_body_mesh(&vertices, Some(&indices), 1.0e-4).expect("mesh");
    let rest_volume = mesh.rest_volume().abs();

    let mut world = make_world();
    floor(&mut world);
    let body = world
        .create_soft_body(
            &mesh,
            &SoftBodyParams::default()
                .with_pressure(100.0)
                .with_position(Vec3::new(0.0, 1.5, 0.0)),
        )
        .expect("soft body");

    for _ in 0..180 {
        world.step(DT).expect("step");
    }

    // Recompute the enclosed volume from the deformed vertex positions. The
    // pressure model should keep it within the same order of magnitude as
    // the rest volume rather than letting the mesh collapse flat.
    let positions: Vec<Vec3> = world
        .soft_vertex_positions(body)
        .expect("positions")
        .map(|(_, p)| p)
        .collect();
    let volume: f32 = mesh
        .faces()
        .iter()
        .map(|&[i0, i1, i2]| {
            positions[i0 as usize]
                .dot(positions[i1 as usize].cross(positions[i2 as usize]))
                / 6.0
        })
        .sum();
    assert!(
        volume.abs() > rest_volume * 0.1,
        "soft body collapsed: volume {} vs rest {}",
        volume.abs(),
        rest_volume
    );
}
