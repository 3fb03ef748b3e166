//! Shared runner for 2-D and 3-D movers.

use crate::config::ON_SLOW_SPEED;
use crate::core::keys::RefsKey;
use crate::core::types::{MoveMode, StepState};
use crate::core::value::MoverValue;
use crate::dynamics::kernel::{run_substeps, slide_step_seconds, step_slide_exact};
use crate::error::MoverResult;
use crate::host::{read_flag, read_value, MoverHost};
use crate::utils::allocator::EntityId;
use crate::utils::math::MotionVector;

use super::refs::MoverDimension;
use super::{dimension_refs, dimension_refs_mut, resolve_step_inputs, StepReport};

/// Per-dimension choices of the vector runner.
pub trait VectorPolicy: MoverDimension + MoverValue {
    /// Slide takes one closed-form step instead of fixed sub-steps.
    const EXACT_SLIDE: bool;

    /// Whether a spring or slide motion continues after this step.
    fn keep_auto_moving(
        is_moving_before: bool,
        average_speed: f64,
        stop_speed: f64,
        output: Self,
        goal: Self,
    ) -> bool;
}

pub(crate) fn run_vector_mover<V, H>(
    host: &mut H,
    entity: EntityId,
    mover: &RefsKey,
    frame_duration: f64,
) -> MoverResult<StepReport>
where
    V: VectorPolicy,
    H: MoverHost + ?Sized,
{
    let refs = dimension_refs::<V, H>(host, entity, mover)?;
    let keys = refs.keys.clone();
    let velocity = refs.velocity;
    let inputs = resolve_step_inputs(host, entity, &keys, &refs.physics_configs, V::KIND)?;

    let original: V = read_value(host, entity, &keys.value)?;
    let goal: V = read_value(host, entity, &keys.value_goal)?;

    let mut step = StepState::new(original, velocity);
    let (output, substeps) = if V::EXACT_SLIDE && inputs.mode == MoveMode::Slide {
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

    let refs = dimension_refs_mut::<V, H>(host, entity, mover)?;
    refs.velocity = step.velocity;
    refs.recent_speeds.push(step.velocity.speed());
    let average_speed = refs.recent_speeds.average();
    refs.average_speed = average_speed;

    let is_auto = inputs.mode.is_auto();
    let mut keep_moving = !is_auto
        || V::keep_auto_moving(
            inputs.is_moving,
            average_speed,
            inputs.params.stop_speed,
            output,
            goal,
        );

    // covers an exactly zero delta too
    if (output - original).is_basically_zero() {
        keep_moving = false;
    }

    let became_slow = is_auto && refs.can_run_on_slow && average_speed < ON_SLOW_SPEED;
    if became_slow {
        refs.can_run_on_slow = false;
    }

    if !keep_moving {
        log::debug!(
            "{} mover `{}` on {entity:?} stopped (average speed {average_speed})",
            V::KIND,
            keys.name
        );
        host.set_state(entity, &keys.is_moving, false.into())?;
    }
    host.set_state(entity, &keys.value, output.into_state())?;

    Ok(StepReport {
        entity,
        mover: mover.clone(),
        kind: V::KIND,
        substeps,
        still_moving: read_flag(host, entity, &keys.is_moving)?,
        became_slow,
        average_speed,
    })
}
