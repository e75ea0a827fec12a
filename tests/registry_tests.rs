use kinesis::*;

fn make_world() -> World {
    let engine = EngineHandle::standalone(EngineConfig::default()).expect("engine init");
    World::new(engine, CollisionFilter::default_static_dynamic())
}

#[test]
fn create_then_destroy_restores_counts() {
    let mut world = make_world();
    assert_eq!(world.body_count(), 0);
    assert_eq!(world.native_body_count(), 0);

    let a = world.create_rigid_body(&RigidBodyDesc::default()).expect("a");
    let b = world
        .create_rigid_body(&RigidBodyDesc::new(Shape::sphere(0.3)))
        .expect("b");
    assert_eq!(world.body_count(), 2);
    assert_eq!(world.native_body_count(), 2);

    assert!(world.destroy(a));
    assert!(world.destroy(b));
    assert_eq!(world.body_count(), 0);
    assert_eq!(world.native_body_count(), 0);
}

#[test]
fn destroy_is_idempotent() {
    let mut world = make_world();
    let handle = world.create_rigid_body(&RigidBodyDesc::default()).expect("create");

    assert!(world.destroy(handle));
    assert!(!world.destroy(handle));
    assert!(!world.destroy(handle));
    assert_eq!(world.body_count(), 0);
}

#[test]
fn stale_handles_miss_after_slot_reuse() {
    let mut world = make_world();
    let old = world.create_rigid_body(&RigidBodyDesc::default()).expect("old");
    world.destroy(old);

    let new = world.create_rigid_body(&RigidBodyDesc::default()).expect("new");
    assert_ne!(old, new);
    assert!(!world.contains(old));
    assert!(world.contains(new));
    assert!(world.rigid_pose(old).is_none());
    assert!(world.rigid_pose(new).is_some());
}

#[test]
fn failed_creation_leaves_no_partial_state() {
    let mut world = make_world();

    let degenerate = RigidBodyDesc::new(Shape::cuboid(Vec3::ZERO));
    assert!(matches!(
        world.create_rigid_body(&degenerate),
        Err(BridgeError::ShapeConstruction(_))
    ));

    let negative_friction = RigidBodyDesc::default().with_friction(-1.0);
    assert!(matches!(
        world.create_rigid_body(&negative_friction),
        Err(BridgeError::InvalidParameter { name: "friction", .. })
    ));

    assert_eq!(world.body_count(), 0);
    assert_eq!(world.native_body_count(), 0);
}

#[test]
fn body_capacity_is_enforced() {
    let config = EngineConfig::default().with_max_bodies(1);
    let engine = EngineHandle::standalone(config).expect("engine init");
    let mut world = World::new(engine, CollisionFilter::default_static_dynamic());

    world.create_rigid_body(&RigidBodyDesc::default()).expect("first");
    let err = world.create_rigid_body(&RigidBodyDesc::default());
    assert!(matches!(
        err,
        Err(BridgeError::CapacityExceeded { limit: 1, requested: 2 })
    ));
    assert_eq!(world.body_count(), 1);

    // Destroying frees the slot again.
    world.destroy_all();
    world.create_rigid_body(&RigidBodyDesc::default()).expect("after teardown");
}

#[test]
fn destroy_all_tears_down_every_body() {
    let mut world = make_world();
    for i in 0..8 {
        world
            .create_rigid_body(
                &RigidBodyDesc::default().with_position(Vec3::new(i as f32 * 2.0, 5.0, 0.0)),
            )
            .expect("create");
    }
    assert_eq!(world.body_count(), 8);

    world.destroy_all();
    assert_eq!(world.body_count(), 0);
    assert_eq!(world.native_body_count(), 0);

    // Teardown twice is fine.
    world.destroy_all();
}

#[test]
fn initial_pose_is_honored() {
    let mut world = make_world();
    let position = Vec3::new(1.0, 2.0, 3.0);
    let orientation = Quat::from_rotation_y(0.5);
    let handle = world
        .create_rigid_body(
            &RigidBodyDesc::default()
                .with_motion(MotionCategory::Static)
                .with_position(position)
                .with_orientation(orientation),
        )
        .expect("create");

    let (p, q) = world.rigid_pose(handle).expect("pose");
    assert!((p - position).length() < 1.0e-6);
    assert!(q.dot(orientation).abs() > 1.0 - 1.0e-6);
}

struct RecordingNode {
    position: Vec3,
    orientation: Quat,
    updates: usize,
}

impl RigidTarget for RecordingNode {
    fn set_pose(&mut self, position: Vec3, orientation: Quat) {
        self.position = position;
        self.orientation = orientation;
        self.updates += 1;
    }
}

#[test]
fn sync_rigid_publishes_pose_and_skips_dead_handles() {
    let mut world = make_world();
    let handle = world
        .create_rigid_body(
            &RigidBodyDesc::default()
                .with_motion(MotionCategory::Static)
                .with_position(Vec3::new(0.0, 4.0, 0.0)),
        )
        .expect("create");

    let mut node = RecordingNode { position: Vec3::ZERO, orientation: Quat::IDENTITY, updates: 0 };
    assert!(sync_rigid(&world, handle, &mut node));
    assert_eq!(node.updates, 1);
    assert!((node.position - Vec3::new(0.0, 4.0, 0.0)).length() < 1.0e-6);

    world.destroy(handle);
    assert!(!sync_rigid(&world, handle, &mut node));
    assert_eq!(node.updates, 1);
}
