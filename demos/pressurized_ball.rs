use kinesis::*;

fn main() -> Result<(), BridgeError> {
    let engine = EngineHandle::acquire(&EngineConfig::default())?;
    let mut world = World::new(engine, CollisionFilter::default_static_dynamic());

    world.create_rigid_body(
        &RigidBodyDesc::new(Shape::cuboid(Vec3::new(10.0, 1.0, 10.0)))
            .with_motion(MotionCategory::Static)
            .with_position(Vec3::new(0.0, -1.0, 0.0)),
    )?;

    let (vertices, indices) = uv_sphere(1.0, 10, 12);
    let mesh = to_soft_body_mesh(&vertices, Some(&indices), 1.0e-4)?;
    println!(
        "sphere mesh: {} vertices, {} faces, {} constraints, rest volume {:.3}",
        mesh.vertex_count(),
        mesh.face_count(),
        mesh.constraints().len(),
        mesh.rest_volume()
    );

    let ball = world.create_soft_body(
        &mesh,
        &SoftBodyParams::default()
            .with_pressure(80.0)
            .with_position(Vec3::new(0.0, 3.0, 0.0)),
    )?;

    for tick in 0..300 {
        world.step(1.0 / 60.0)?;
        if tick % 60 == 0 {
            let lowest = world
                .soft_vertex_positions(ball)
                .into_iter()
                .flatten()
                .map(|(_, p)| p.y)
                .fold(f32::INFINITY, f32::min);
            println!("t = {:.2}s: lowest vertex at y = {:.3}", world.simulation_time(), lowest);
        }
    }

    world.destroy_all();
    Ok(())
}
