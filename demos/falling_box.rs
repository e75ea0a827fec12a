use kinesis::*;

fn main() -> Result<(), BridgeError> {
    let engine = EngineHandle::acquire(&EngineConfig::default())?;
    let mut world = World::new(engine, CollisionFilter::default_static_dynamic());

    world.create_rigid_body(
        &RigidBodyDesc::new(Shape::cuboid(Vec3::new(10.0, 1.0, 10.0)))
            .with_motion(MotionCategory::Static)
            .with_position(Vec3::new(0.0, -1.0, 0.0)),
    )?;

    let cube = world.create_rigid_body(
        &RigidBodyDesc::new(Shape::cuboid(Vec3::splat(0.5)))
            .with_position(Vec3::new(0.0, 5.0, 0.0))
            .with_restitution(0.3),
    )?;

    for tick in 0..240 {
        let report = world.step(1.0 / 60.0)?;
        if tick % 30 == 0 {
            if let Some((position, _)) = world.rigid_pose(cube) {
                println!(
                    "t = {:.2}s (substeps {}): cube at y = {:.3}",
                    world.simulation_time(),
                    report.substeps,
                    position.y
                );
            }
        }
    }

    world.destroy_all();
    Ok(())
}
