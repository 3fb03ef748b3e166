//! Runner for movers animating several named scalar channels at once.

use crate::config::CHANNEL_SPRING_STOP_SPEED;
use crate::core::keys::RefsKey;
use crate::core::types::{MoverKind, StepState};
use crate::core::value::{ChannelValues, MoverValue};
use crate::dynamics::kernel::run_substeps;
use crate::error::{MoverError, MoverResult};
use crate::host::{read_flag, read_value, MoverHost};
use crate::utils::allocator::EntityId;

use super::refs::{AnyMoverRefs, MultiMoverRefs};
use super::scalar::scalar_should_stop;
use super::{resolve_step_inputs, StepReport};

fn multi_refs<'h, H: MoverHost + ?Sized>(
    host: &'h H,
    entity: EntityId,
    mover: &RefsKey,
) -> MoverResult<&'h MultiMoverRefs> {
    match host.refs(entity, mover) {
        Some(AnyMoverRefs::Multi(refs)) => Ok(refs),
        Some(other) => Err(MoverError::KindMismatch {
            expected: MoverKind::Multi,
            found: other.kind(),
        }),
        None => Err(MoverError::UnknownMover(mover.to_string())),
    }
}

fn multi_refs_mut<'h, H: MoverHost + ?Sized>(
    host: &'h mut H,
    entity: EntityId,
    mover: &RefsKey,
) -> MoverResult<&'h mut MultiMoverRefs> {
    match host.refs_mut(entity, mover) {
        Some(AnyMoverRefs::Multi(refs)) => Ok(refs),
        Some(other) => Err(MoverError::KindMismatch {
            expected: MoverKind::Multi,
            found: other.kind(),
        }),
        None => Err(MoverError::UnknownMover(mover.to_string())),
    }
}

fn channel(values: &ChannelValues, name: &str) -> MoverResult<f64> {
    values
        .get(name)
        .copied()
        .ok_or_else(|| MoverError::UnknownChannel(name.to_string()))
}

/// Advances every channel of a multi mover by one frame.
///
/// Each channel follows the scalar stop rule on its own; the mover keeps
/// moving while any channel does. Channels in the value record that the mover
/// does not animate are carried over untouched.
pub fn run_mover_multi<H: MoverHost + ?Sized>(
    host: &mut H,
    entity: EntityId,
    mover: &RefsKey,
    frame_duration: f64,
) -> MoverResult<StepReport> {
    let refs = multi_refs(host, entity, mover)?;
    let keys = refs.keys.clone();
    let inputs = resolve_step_inputs(
        host,
        entity,
        &keys,
        &refs.physics_configs,
        MoverKind::Multi,
    )?;

    let values_before: ChannelValues = read_value(host, entity, &keys.value)?;
    let goals: ChannelValues = read_value(host, entity, &keys.value_goal)?;

    // every channel must resolve before any refs are touched
    let resolved = multi_refs(host, entity, mover)?
        .channels
        .keys()
        .map(|name| Ok((channel(&values_before, name)?, channel(&goals, name)?)))
        .collect::<MoverResult<Vec<(f64, f64)>>>()?;

    let refs = multi_refs_mut(host, entity, mover)?;
    let mut new_values = values_before.clone();
    let mut should_keep_going = false;
    let mut substeps = 0;
    let mut average_speed = 0.0_f64;

    for ((name, channel_refs), (value_before, goal)) in refs.channels.iter_mut().zip(resolved) {
        let mut step = StepState::new(value_before, channel_refs.velocity);
        let run = run_substeps(
            &mut step,
            goal,
            inputs.mode,
            &inputs.params,
            frame_duration,
        );

        channel_refs.velocity = step.velocity;
        channel_refs.recent_speeds.push(step.velocity.abs());
        let channel_average = channel_refs.recent_speeds.average();

        let should_stop = scalar_should_stop(
            inputs.mode,
            channel_average,
            CHANNEL_SPRING_STOP_SPEED,
            value_before,
            goal,
            step.velocity,
        );
        if !should_stop {
            should_keep_going = true;
        }

        new_values.insert(name.clone(), run.output);
        substeps = substeps.max(run.substeps);
        average_speed = average_speed.max(channel_average);
    }

    if !should_keep_going {
        log::debug!("multi mover `{}` on {entity:?} settled", keys.name);
        host.set_state(entity, &keys.is_moving, false.into())?;
    }
    host.set_state(entity, &keys.value, new_values.into_state())?;

    Ok(StepReport {
        entity,
        mover: mover.clone(),
        kind: MoverKind::Multi,
        substeps,
        still_moving: read_flag(host, entity, &keys.is_moving)?,
        became_slow: false,
        average_speed,
    })
}
