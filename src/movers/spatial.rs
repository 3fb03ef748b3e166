use glam::DVec3;

use crate::config::QUICK_DISTANCE_CLOSE;
use crate::core::keys::RefsKey;
use crate::error::MoverResult;
use crate::host::MoverHost;
use crate::utils::allocator::EntityId;
use crate::utils::math::MotionVector;

use super::vector::{run_vector_mover, VectorPolicy};
use super::StepReport;

impl VectorPolicy for DVec3 {
    const EXACT_SLIDE: bool = false;

    /// Faster than the stop speed always continues; slower ones continue only
    /// while still clearly away from the goal.
    fn keep_auto_moving(
        is_moving_before: bool,
        average_speed: f64,
        stop_speed: f64,
        output: Self,
        goal: Self,
    ) -> bool {
        if average_speed > stop_speed {
            return is_moving_before;
        }
        let is_quite_close = (output - goal).quick_distance() < QUICK_DISTANCE_CLOSE;
        is_moving_before && !is_quite_close
    }
}

/// Advances a 3-D mover by one frame.
pub fn run_mover_3d<H: MoverHost + ?Sized>(
    host: &mut H,
    entity: EntityId,
    mover: &RefsKey,
    frame_duration: f64,
) -> MoverResult<StepReport> {
    run_vector_mover::<DVec3, H>(host, entity, mover, frame_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MoveMode;
    use crate::core::value::MoverInitialState;
    use crate::world::{MoverSpec, MoverWorld};

    #[test]
    fn slow_and_close_stops_while_slow_and_far_continues() {
        let goal = DVec3::new(1.0, 1.0, 1.0);
        assert!(!DVec3::keep_auto_moving(
            true,
            0.1,
            0.5,
            goal + DVec3::new(0.05, -0.05, 0.04),
            goal
        ));
        assert!(DVec3::keep_auto_moving(
            true,
            0.1,
            0.5,
            goal + DVec3::new(0.2, 0.0, 0.0),
            goal
        ));
        assert!(DVec3::keep_auto_moving(true, 3.0, 0.5, goal, goal));
        assert!(!DVec3::keep_auto_moving(false, 3.0, 0.5, goal, goal));
    }

    #[test]
    fn slide_runs_fixed_substeps() {
        let mut world = MoverWorld::new();
        let entity = world.spawn();
        let keys = world
            .add_mover(
                entity,
                MoverSpec::spatial(
                    "camera",
                    MoverInitialState::at(DVec3::ZERO).with_mode(MoveMode::Slide),
                ),
            )
            .unwrap();
        world
            .set_velocity(entity, "camera", DVec3::new(0.0, 50.0, 0.0))
            .unwrap();
        world.set_goal(entity, "camera", DVec3::ZERO).unwrap();

        let report = run_mover_3d(&mut world, entity, &keys.refs, 16.6667).unwrap();
        assert_eq!(report.substeps, 33);
        assert!(report.still_moving);
        let value: DVec3 = world.value(entity, "camera").unwrap();
        assert!(value.y > 0.0);
    }

    #[test]
    fn spring_settles_on_its_goal() {
        let mut world = MoverWorld::new();
        let entity = world.spawn();
        let keys = world
            .add_mover(
                entity,
                MoverSpec::spatial("camera", MoverInitialState::at(DVec3::ZERO)),
            )
            .unwrap();
        let goal = DVec3::new(10.0, -5.0, 2.5);
        world.set_goal(entity, "camera", goal).unwrap();

        let mut frames = 0;
        while world.is_moving(entity, "camera").unwrap() && frames < 2_000 {
            run_mover_3d(&mut world, entity, &keys.refs, 16.6667).unwrap();
            frames += 1;
        }

        assert!(frames < 2_000);
        let value: DVec3 = world.value(entity, "camera").unwrap();
        assert!((value - goal).quick_distance() < 1.0);
    }
}
