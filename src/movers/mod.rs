//! Mover runners for every dimensionality plus the autorun loop.
//!
//! A runner reads the current value and velocity, advances them across one
//! frame using fixed sub-steps, writes the result back to the host and decides
//! whether the motion should stop.

pub mod multi;
pub mod planar;
pub mod refs;
pub mod scalar;
pub mod spatial;
pub mod vector;

use crate::core::keys::{MoverKeys, RefsKey};
use crate::core::physics_config::PhysicsConfigs;
use crate::core::types::{MoveMode, MoverKind, PhysicsParameters};
use crate::error::{MoverError, MoverResult};
use crate::host::{read_flag, read_mode, MoverHost};
use crate::utils::allocator::EntityId;

pub use multi::run_mover_multi;
pub use planar::run_mover_2d;
pub use refs::{AnyMoverRefs, ChannelRefs, MoverDimension, MoverRefs, MultiMoverRefs};
pub use scalar::run_mover_1d;
pub use spatial::run_mover_3d;

/// Outcome of one runner invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub entity: EntityId,
    pub mover: RefsKey,
    pub kind: MoverKind,
    /// Fixed sub-steps taken; zero for the exact slide step.
    pub substeps: u32,
    /// `is_moving` after the step.
    pub still_moving: bool,
    /// The one-shot slow threshold was crossed during this step.
    pub became_slow: bool,
    pub average_speed: f64,
}

/// Summary of an autorun loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutorunSummary {
    pub frames: usize,
    pub stopped: bool,
}

/// Per-step inputs resolved from observable state.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StepInputs {
    pub mode: MoveMode,
    pub is_moving: bool,
    pub params: PhysicsParameters,
}

/// Resolves mode, moving flag and the active physics variant.
///
/// Configs written to state take precedence over the refs configs. A variant
/// that cannot be resolved falls back to the kind defaults.
pub(crate) fn resolve_step_inputs<H: MoverHost + ?Sized>(
    host: &H,
    entity: EntityId,
    keys: &MoverKeys,
    refs_configs: &PhysicsConfigs,
    kind: MoverKind,
) -> MoverResult<StepInputs> {
    let mode = read_mode(host, entity, &keys.move_mode)?;
    let is_moving = read_flag(host, entity, &keys.is_moving)?;

    let config_name = host
        .state(entity, &keys.move_config_name)
        .and_then(|value| value.as_config_name());
    let state_configs = host
        .state(entity, &keys.move_configs)
        .and_then(|value| value.as_configs());

    let params = match state_configs {
        Some(configs) => match configs.resolve(config_name) {
            Some((name, params)) => {
                params.validate(name)?;
                Some(params)
            }
            None => None,
        },
        None => refs_configs.resolve(config_name).map(|(_, params)| params),
    };

    let params = params.unwrap_or_else(|| {
        log::warn!(
            "mover `{}` has no physics variant {:?}, using {kind} defaults",
            keys.name,
            config_name.unwrap_or("default")
        );
        PhysicsParameters::defaults(kind)
    });

    Ok(StepInputs {
        mode,
        is_moving,
        params,
    })
}

/// Fetches the refs of `mover` as the variant for dimension `D`.
pub(crate) fn dimension_refs<'h, D, H>(
    host: &'h H,
    entity: EntityId,
    mover: &RefsKey,
) -> MoverResult<&'h MoverRefs<D>>
where
    D: MoverDimension,
    H: MoverHost + ?Sized,
{
    let any = host
        .refs(entity, mover)
        .ok_or_else(|| MoverError::UnknownMover(mover.to_string()))?;
    D::refs(any).ok_or(MoverError::KindMismatch {
        expected: D::KIND,
        found: any.kind(),
    })
}

pub(crate) fn dimension_refs_mut<'h, D, H>(
    host: &'h mut H,
    entity: EntityId,
    mover: &RefsKey,
) -> MoverResult<&'h mut MoverRefs<D>>
where
    D: MoverDimension,
    H: MoverHost + ?Sized,
{
    let any = host
        .refs_mut(entity, mover)
        .ok_or_else(|| MoverError::UnknownMover(mover.to_string()))?;
    let found = any.kind();
    D::refs_mut(any).ok_or(MoverError::KindMismatch {
        expected: D::KIND,
        found,
    })
}

/// Advances one mover by one frame without firing callbacks.
pub fn step_mover<H: MoverHost + ?Sized>(
    host: &mut H,
    kind: MoverKind,
    entity: EntityId,
    mover: &RefsKey,
    frame_duration: f64,
) -> MoverResult<StepReport> {
    match kind {
        MoverKind::OneD => run_mover_1d(host, entity, mover, frame_duration),
        MoverKind::TwoD => run_mover_2d(host, entity, mover, frame_duration),
        MoverKind::ThreeD => run_mover_3d(host, entity, mover, frame_duration),
        MoverKind::Multi => run_mover_multi(host, entity, mover, frame_duration),
    }
}

/// Advances one mover by one frame and fires `on_slow` when it slows down.
pub fn run_mover<H: MoverHost + ?Sized>(
    host: &mut H,
    kind: MoverKind,
    entity: EntityId,
    mover: &RefsKey,
    frame_duration: f64,
    on_slow: Option<&mut dyn FnMut()>,
) -> MoverResult<StepReport> {
    let report = step_mover(host, kind, entity, mover, frame_duration)?;
    if report.became_slow {
        if let Some(callback) = on_slow {
            callback();
        }
    }
    Ok(report)
}

/// Keeps stepping a mover, one frame duration at a time, while it is moving.
///
/// The first frame always runs. Every later frame first checks `is_moving`,
/// so clearing the flag from outside cancels the loop.
pub fn autorun<H, I>(
    host: &mut H,
    kind: MoverKind,
    entity: EntityId,
    mover: &RefsKey,
    frames: I,
    mut on_slow: Option<&mut dyn FnMut()>,
) -> MoverResult<AutorunSummary>
where
    H: MoverHost + ?Sized,
    I: IntoIterator<Item = f64>,
{
    let is_moving_key = host
        .refs(entity, mover)
        .map(|refs| refs.keys().is_moving.clone())
        .ok_or_else(|| MoverError::UnknownMover(mover.to_string()))?;

    let mut summary = AutorunSummary::default();
    for frame_duration in frames {
        if summary.frames > 0 && !read_flag(host, entity, &is_moving_key)? {
            summary.stopped = true;
            break;
        }

        let report = step_mover(host, kind, entity, mover, frame_duration)?;
        summary.frames += 1;

        if report.became_slow {
            if let Some(callback) = on_slow.as_mut() {
                callback();
            }
        }
        if !report.still_moving {
            summary.stopped = true;
            break;
        }
    }

    Ok(summary)
}
