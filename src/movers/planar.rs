use glam::DVec2;

use crate::core::keys::RefsKey;
use crate::error::MoverResult;
use crate::host::MoverHost;
use crate::utils::allocator::EntityId;

use super::vector::{run_vector_mover, VectorPolicy};
use super::StepReport;

impl VectorPolicy for DVec2 {
    const EXACT_SLIDE: bool = true;

    fn keep_auto_moving(
        is_moving_before: bool,
        average_speed: f64,
        stop_speed: f64,
        _output: Self,
        _goal: Self,
    ) -> bool {
        is_moving_before && average_speed > stop_speed
    }
}

/// Advances a 2-D mover by one frame.
pub fn run_mover_2d<H: MoverHost + ?Sized>(
    host: &mut H,
    entity: EntityId,
    mover: &RefsKey,
    frame_duration: f64,
) -> MoverResult<StepReport> {
    run_vector_mover::<DVec2, H>(host, entity, mover, frame_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MoveMode;
    use crate::core::value::MoverInitialState;
    use crate::world::{MoverSpec, MoverWorld};

    fn planar_world(initial: MoverInitialState<DVec2>) -> (MoverWorld, EntityId, RefsKey) {
        let mut world = MoverWorld::new();
        let entity = world.spawn();
        let keys = world
            .add_mover(entity, MoverSpec::planar("position", initial))
            .unwrap();
        (world, entity, keys.refs)
    }

    #[test]
    fn spring_keeps_moving_through_warm_up() {
        let (mut world, entity, refs) = planar_world(MoverInitialState::at(DVec2::ZERO));
        world
            .set_goal(entity, "position", DVec2::new(300.0, -200.0))
            .unwrap();

        for _ in 0..5 {
            let report = run_mover_2d(&mut world, entity, &refs, 16.6667).unwrap();
            assert!(report.still_moving);
            assert!(report.average_speed.is_infinite());
        }
        let value: DVec2 = world.value(entity, "position").unwrap();
        assert!(value.x > 0.0 && value.y < 0.0);
    }

    #[test]
    fn idle_drag_is_stopped_by_the_zero_delta_guard() {
        let initial = MoverInitialState::at(DVec2::new(4.0, 4.0)).with_mode(MoveMode::Drag);
        let (mut world, entity, refs) = planar_world(initial);
        world.set_goal(entity, "position", DVec2::ZERO).unwrap();

        let report = run_mover_2d(&mut world, entity, &refs, 16.6667).unwrap();
        assert!(!report.still_moving);
        assert_eq!(
            world.value::<DVec2>(entity, "position").unwrap(),
            DVec2::new(4.0, 4.0)
        );
    }

    #[test]
    fn moving_drag_keeps_going() {
        let initial = MoverInitialState::at(DVec2::ZERO).with_mode(MoveMode::Drag);
        let (mut world, entity, refs) = planar_world(initial);
        world
            .set_velocity(entity, "position", DVec2::new(120.0, 0.0))
            .unwrap();
        world.set_goal(entity, "position", DVec2::ZERO).unwrap();

        for _ in 0..20 {
            let report = run_mover_2d(&mut world, entity, &refs, 16.6667).unwrap();
            assert!(report.still_moving);
            assert!(!report.became_slow);
        }
    }

    #[test]
    fn slide_uses_the_exact_step() {
        let initial = MoverInitialState::at(DVec2::ZERO).with_mode(MoveMode::Slide);
        let (mut world, entity, refs) = planar_world(initial);
        world
            .set_velocity(entity, "position", DVec2::new(600.0, 800.0))
            .unwrap();
        world.set_goal(entity, "position", DVec2::ZERO).unwrap();

        let report = run_mover_2d(&mut world, entity, &refs, 16.6667).unwrap();
        let value: DVec2 = world.value(entity, "position").unwrap();
        assert_eq!(report.substeps, 0);
        assert!((value.x / value.y - 0.75).abs() < 1e-9);
    }
}
