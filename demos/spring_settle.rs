use kinetic_movers::*;

fn main() -> Result<(), MoverError> {
    env_logger::init();

    let mut world = MoverWorld::new();
    world.set_parallel_enabled(true);

    let card = world.spawn();
    world.add_mover(
        card,
        MoverSpec::planar("position", MoverInitialState::at(DVec2::ZERO))
            .with_physics(PhysicsOverrides::default().with_stiffness(40.0)),
    )?;
    world.add_mover(card, MoverSpec::scalar("opacity", MoverInitialState::at(0.0)))?;
    world.on_slow(card, "position", |entity| {
        println!("{entity:?} slowed down, safe to start the next animation");
    })?;

    world.set_goal(card, "position", DVec2::new(240.0, 80.0))?;
    world.set_goal(card, "opacity", 1.0)?;

    let mut frame = 0;
    loop {
        let summary = world.tick(config::DEFAULT_FRAME_DURATION);
        frame += 1;
        if frame % 10 == 0 || summary.stopped > 0 {
            let position: DVec2 = world.value(card, "position")?;
            let opacity: f64 = world.value(card, "opacity")?;
            println!("frame {frame:>3}: position {position:.2}, opacity {opacity:.3}");
        }
        if summary.stepped == 0 {
            break;
        }
    }
    println!("settled after {frame} frames");
    Ok(())
}
