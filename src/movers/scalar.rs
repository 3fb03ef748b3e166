//! Runner for single-number movers.

use crate::config::{NEAR_TARGET_DISTANCE, SCALAR_STILL_SPEED};
use crate::core::keys::RefsKey;
use crate::core::types::{MoveMode, MoverKind, StepState};
use crate::core::value::StateValue;
use crate::dynamics::kernel::{run_substeps, slide_step_seconds, step_slide_exact};
use crate::error::MoverResult;
use crate::host::{read_flag, read_value, MoverHost};
use crate::utils::allocator::EntityId;

use super::{dimension_refs, dimension_refs_mut, resolve_step_inputs, StepReport};

/// Stop rule shared by scalar movers and every channel of a multi mover.
///
/// `value_before` is the value read before stepping. A spring whose velocity
/// is exactly zero next to its goal stops without waiting for the history.
pub(crate) fn scalar_should_stop(
    mode: MoveMode,
    average_speed: f64,
    spring_stop_speed: f64,
    value_before: f64,
    goal: f64,
    velocity: f64,
) -> bool {
    match mode {
        MoveMode::Spring => {
            let is_near_target = (value_before - goal).abs() < NEAR_TARGET_DISTANCE;
            let is_slow = average_speed.abs() <= spring_stop_speed || velocity == 0.0;
            is_near_target && is_slow
        }
        MoveMode::Slide | MoveMode::Drag | MoveMode::Push => {
            average_speed.abs() <= SCALAR_STILL_SPEED
        }
    }
}

/// Advances a 1-D mover by one frame.
pub fn run_mover_1d<H: MoverHost + ?Sized>(
    host: &mut H,
    entity: EntityId,
    mover: &RefsKey,
    frame_duration: f64,
) -> MoverResult<StepReport> {
    let refs = dimension_refs::<f64, H>(host, entity, mover)?;
    let keys = refs.keys.clone();
    let velocity = refs.velocity;
    let inputs = resolve_step_inputs(
        host,
        entity,
        &keys,
        &refs.physics_configs,
        MoverKind::OneD,
    )?;

    let value_before: f64 = read_value(host, entity, &keys.value)?;
    let goal: f64 = read_value(host, entity, &keys.value_goal)?;

    let mut step = StepState::new(value_before, velocity);
    let (output, substeps) = if inputs.mode == MoveMode::Slide {
        step_slide_exact(
            &mut step,
            inputs.params.friction,
            slide_step_seconds(frame_duration),
        );
        (step.position, 0)
    } else {
        let run = run_substeps(
            &mut step,
            goal,
            inputs.mode,
            &inputs.params,
            frame_duration,
        );
        (run.output, run.substeps)
    };

    let refs = dimension_refs_mut::<f64, H>(host, entity, mover)?;
    refs.velocity = step.velocity;
    refs.recent_speeds.push(step.velocity.abs());
    let average_speed = refs.recent_speeds.average();
    refs.average_speed = average_speed;

    let should_stop = scalar_should_stop(
        inputs.mode,
        average_speed,
        inputs.params.stop_speed,
        value_before,
        goal,
        step.velocity,
    );
    if should_stop {
        log::debug!("mover `{}` on {entity:?} settled at {output}", keys.name);
        host.set_state(entity, &keys.is_moving, StateValue::Flag(false))?;
    }
    host.set_state(entity, &keys.value, StateValue::Scalar(output))?;

    Ok(StepReport {
        entity,
        mover: mover.clone(),
        kind: MoverKind::OneD,
        substeps,
        still_moving: read_flag(host, entity, &keys.is_moving)?,
        became_slow: false,
        average_speed,
    })
}
