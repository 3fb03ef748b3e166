//! Reference host: entities owning observable state and private mover refs,
//! driven by duration ticks, named time sources or autorun loops.

pub mod time_sources;

use std::collections::HashMap;
use std::time::Instant;

use glam::{DVec2, DVec3};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::MAXIMUM_FRAME_TIME;
use crate::core::keys::{MoverKeys, RefsKey, StateKey};
use crate::core::physics_config::{PhysicsConfigInput, PhysicsConfigs};
use crate::core::types::{MoveMode, MoverKind};
use crate::core::value::{ChannelValues, MoverInitialState, MoverValue, StateValue};
use crate::error::{MoverError, MoverResult};
use crate::host::{read_flag, read_value, MoverHost};
use crate::movers::{self, AnyMoverRefs, AutorunSummary, MoverDimension, StepReport};
use crate::utils::allocator::{Arena, EntityId};
use crate::utils::logging::{warn_if_frame_budget_exceeded, TraceSpan};
use crate::utils::profiling::{ScopedTimer, TickProfile};

pub use time_sources::TimeSources;

/// Callback run when a mover first slows below the on-slow threshold.
pub type SlowHandler = Box<dyn FnMut(EntityId) + Send + Sync>;

#[derive(Debug, Default)]
struct Entity {
    state: HashMap<StateKey, StateValue>,
    refs: HashMap<RefsKey, AnyMoverRefs>,
}

impl Entity {
    fn moving_movers(&self) -> Vec<(RefsKey, MoverKind)> {
        self.refs
            .iter()
            .filter(|(_, refs)| {
                matches!(
                    self.state.get(&refs.keys().is_moving),
                    Some(StateValue::Flag(true))
                )
            })
            .map(|(key, refs)| (key.clone(), refs.kind()))
            .collect()
    }
}

/// A single entity borrowed on its own so entities can be stepped apart.
struct EntitySlot<'a> {
    id: EntityId,
    entity: &'a mut Entity,
}

impl MoverHost for EntitySlot<'_> {
    fn state(&self, entity: EntityId, key: &StateKey) -> Option<&StateValue> {
        (entity == self.id)
            .then(|| self.entity.state.get(key))
            .flatten()
    }

    fn set_state(
        &mut self,
        entity: EntityId,
        key: &StateKey,
        value: StateValue,
    ) -> MoverResult<()> {
        if entity != self.id {
            return Err(MoverError::UnknownEntity(entity));
        }
        self.entity.state.insert(key.clone(), value);
        Ok(())
    }

    fn refs(&self, entity: EntityId, key: &RefsKey) -> Option<&AnyMoverRefs> {
        (entity == self.id)
            .then(|| self.entity.refs.get(key))
            .flatten()
    }

    fn refs_mut(&mut self, entity: EntityId, key: &RefsKey) -> Option<&mut AnyMoverRefs> {
        if entity != self.id {
            return None;
        }
        self.entity.refs.get_mut(key)
    }
}

/// Everything needed to register one mover on an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MoverSpec {
    pub name: String,
    pub kind: MoverKind,
    pub physics: Option<PhysicsConfigInput>,
    pub channels: Vec<String>,
    initial: Vec<(StateKey, StateValue)>,
}

impl MoverSpec {
    fn with_initial<V: MoverValue>(
        name: &str,
        kind: MoverKind,
        initial: MoverInitialState<V>,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind,
            physics: None,
            channels: Vec::new(),
            initial: MoverKeys::new(name).initial_entries(initial),
        }
    }

    pub fn scalar(name: &str, initial: MoverInitialState<f64>) -> Self {
        Self::with_initial(name, MoverKind::OneD, initial)
    }

    pub fn planar(name: &str, initial: MoverInitialState<DVec2>) -> Self {
        Self::with_initial(name, MoverKind::TwoD, initial)
    }

    pub fn spatial(name: &str, initial: MoverInitialState<DVec3>) -> Self {
        Self::with_initial(name, MoverKind::ThreeD, initial)
    }

    /// A multi mover over `channels`. Channels absent from the initial value
    /// start at zero, and a missing goal starts at the value.
    pub fn multi<I, S>(name: &str, channels: I, mut initial: MoverInitialState<ChannelValues>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channels: Vec<String> = channels.into_iter().map(Into::into).collect();

        let mut value = initial.value.take().unwrap_or_default();
        for channel in &channels {
            value.entry(channel.clone()).or_insert(0.0);
        }
        let mut goal = initial.value_goal.take().unwrap_or_else(|| value.clone());
        for channel in &channels {
            let start = value.get(channel).copied().unwrap_or_default();
            goal.entry(channel.clone()).or_insert(start);
        }
        initial.value = Some(value);
        initial.value_goal = Some(goal);

        let mut spec = Self::with_initial(name, MoverKind::Multi, initial);
        spec.channels = channels;
        spec
    }

    pub fn with_physics(mut self, physics: impl Into<PhysicsConfigInput>) -> Self {
        self.physics = Some(physics.into());
        self
    }
}

/// Outcome of a world tick or time-source advance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    pub stepped: usize,
    pub stopped: usize,
    pub slowed: usize,
    /// Sorted by entity, then mover.
    pub reports: Vec<StepReport>,
}

/// Which moving movers a stepping pass picks up.
#[derive(Debug, Clone, Copy)]
enum Selection<'a> {
    /// Movers without a named time source, driven by [`MoverWorld::tick`].
    Unassigned,
    Source(&'a str),
}

impl Selection<'_> {
    fn includes(self, sources: &TimeSources, entity: EntityId, mover: &RefsKey) -> bool {
        let assigned = sources.source_of(entity, mover);
        match self {
            Selection::Unassigned => assigned.is_none(),
            Selection::Source(name) => assigned == Some(name),
        }
    }
}

fn clamp_frame(frame_duration: f64) -> f64 {
    frame_duration.clamp(0.0, MAXIMUM_FRAME_TIME)
}

/// Central container owning entities, their movers and the tick drivers.
pub struct MoverWorld {
    entities: Arena<Entity>,
    time_sources: TimeSources,
    slow_handlers: HashMap<(EntityId, RefsKey), SlowHandler>,
    parallel_enabled: bool,
    profile: TickProfile,
}

impl Default for MoverWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl MoverWorld {
    pub fn new() -> Self {
        Self {
            entities: Arena::new(),
            time_sources: TimeSources::new(),
            slow_handlers: HashMap::new(),
            parallel_enabled: false,
            profile: TickProfile::default(),
        }
    }

    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        if enabled && !cfg!(feature = "parallel") {
            log::warn!("built without the `parallel` feature, ticks stay sequential");
        }
        self.parallel_enabled = enabled;
    }

    pub fn parallel_enabled(&self) -> bool {
        self.parallel_enabled
    }

    /// Timing of the most recent tick or time-source advance.
    pub fn profile(&self) -> &TickProfile {
        &self.profile
    }

    pub fn spawn(&mut self) -> EntityId {
        self.entities.insert(Entity::default())
    }

    /// Removes an entity with its state, refs, handlers and time-source bindings.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        if self.entities.remove(entity).is_none() {
            return false;
        }
        self.slow_handlers.retain(|(owner, _), _| *owner != entity);
        self.time_sources.forget_entity(entity);
        true
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.get(entity).is_some()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Registers a mover, writing its initial state and building its refs.
    pub fn add_mover(&mut self, entity: EntityId, spec: MoverSpec) -> MoverResult<MoverKeys> {
        let slot = self
            .entities
            .get_mut(entity)
            .ok_or(MoverError::UnknownEntity(entity))?;

        let refs = AnyMoverRefs::build(
            spec.kind,
            &spec.name,
            spec.physics.as_ref(),
            &spec.channels,
        )?;
        for (_, value) in &spec.initial {
            if let StateValue::Configs(configs) = value {
                configs.validate()?;
            }
        }

        let keys = refs.keys().clone();
        if slot.refs.insert(keys.refs.clone(), refs).is_some() {
            log::warn!("mover `{}` on {entity:?} replaced", spec.name);
        }
        slot.state.extend(spec.initial);
        log::debug!("registered {} mover `{}` on {entity:?}", spec.kind, spec.name);
        Ok(keys)
    }

    fn mover_refs(&self, entity: EntityId, mover: &str) -> MoverResult<&AnyMoverRefs> {
        let slot = self
            .entities
            .get(entity)
            .ok_or(MoverError::UnknownEntity(entity))?;
        let key = RefsKey::new(mover);
        slot.refs
            .get(&key)
            .ok_or_else(|| MoverError::UnknownMover(key.to_string()))
    }

    fn mover_refs_mut(&mut self, entity: EntityId, mover: &str) -> MoverResult<&mut AnyMoverRefs> {
        let slot = self
            .entities
            .get_mut(entity)
            .ok_or(MoverError::UnknownEntity(entity))?;
        let key = RefsKey::new(mover);
        slot.refs
            .get_mut(&key)
            .ok_or_else(|| MoverError::UnknownMover(key.to_string()))
    }

    pub fn keys(&self, entity: EntityId, mover: &str) -> MoverResult<MoverKeys> {
        Ok(self.mover_refs(entity, mover)?.keys().clone())
    }

    pub fn kind(&self, entity: EntityId, mover: &str) -> MoverResult<MoverKind> {
        Ok(self.mover_refs(entity, mover)?.kind())
    }

    /// Read-only access to a mover's refs.
    pub fn refs(&self, entity: EntityId, mover: &str) -> MoverResult<&AnyMoverRefs> {
        self.mover_refs(entity, mover)
    }

    /// Goal-change effect: writes the goal and arms the mover.
    ///
    /// Arming from idle forgets old speeds and re-arms the on-slow latch. A
    /// 3-D spring forgets its speeds on every goal change.
    pub fn set_goal<V: MoverValue>(
        &mut self,
        entity: EntityId,
        mover: &str,
        goal: V,
    ) -> MoverResult<()> {
        let slot = self
            .entities
            .get_mut(entity)
            .ok_or(MoverError::UnknownEntity(entity))?;
        let refs_key = RefsKey::new(mover);
        let refs = slot
            .refs
            .get_mut(&refs_key)
            .ok_or_else(|| MoverError::UnknownMover(refs_key.to_string()))?;
        let keys = refs.keys().clone();

        let goal = goal.into_state();
        check_shape(refs.kind(), &goal, &keys.value_goal)?;

        let was_moving = matches!(
            slot.state.get(&keys.is_moving),
            Some(StateValue::Flag(true))
        );
        let mode = slot
            .state
            .get(&keys.move_mode)
            .and_then(StateValue::as_mode)
            .unwrap_or_default();

        if !was_moving {
            refs.begin_motion();
        }
        if refs.kind() == MoverKind::ThreeD && mode == MoveMode::Spring {
            refs.clear_speeds();
        }

        slot.state.insert(keys.value_goal, goal);
        slot.state.insert(keys.is_moving, StateValue::Flag(true));
        Ok(())
    }

    pub fn value<V: MoverValue>(&self, entity: EntityId, mover: &str) -> MoverResult<V> {
        let keys = self.keys(entity, mover)?;
        read_value(self, entity, &keys.value)
    }

    pub fn goal<V: MoverValue>(&self, entity: EntityId, mover: &str) -> MoverResult<V> {
        let keys = self.keys(entity, mover)?;
        read_value(self, entity, &keys.value_goal)
    }

    pub fn is_moving(&self, entity: EntityId, mover: &str) -> MoverResult<bool> {
        let keys = self.keys(entity, mover)?;
        read_flag(self, entity, &keys.is_moving)
    }

    pub fn set_move_mode(
        &mut self,
        entity: EntityId,
        mover: &str,
        mode: MoveMode,
    ) -> MoverResult<()> {
        let keys = self.keys(entity, mover)?;
        self.set_state(entity, &keys.move_mode, StateValue::Mode(mode))
    }

    /// Selects a physics variant. Unknown names fall back to the `default`
    /// variant when stepped, and to the kind defaults if that is missing too.
    pub fn set_move_config_name(
        &mut self,
        entity: EntityId,
        mover: &str,
        name: impl Into<String>,
    ) -> MoverResult<()> {
        let keys = self.keys(entity, mover)?;
        self.set_state(entity, &keys.move_config_name, StateValue::ConfigName(name.into()))
    }

    /// Overrides the registered physics variants through state.
    pub fn set_move_configs(
        &mut self,
        entity: EntityId,
        mover: &str,
        configs: PhysicsConfigs,
    ) -> MoverResult<()> {
        configs.validate()?;
        let keys = self.keys(entity, mover)?;
        self.set_state(entity, &keys.move_configs, StateValue::Configs(configs))
    }

    /// Sets the velocity of a 1-D, 2-D or 3-D mover, typically for drag or push.
    pub fn set_velocity<V: MoverDimension>(
        &mut self,
        entity: EntityId,
        mover: &str,
        velocity: V,
    ) -> MoverResult<()> {
        let any = self.mover_refs_mut(entity, mover)?;
        let found = any.kind();
        let refs = V::refs_mut(any).ok_or(MoverError::KindMismatch {
            expected: V::KIND,
            found,
        })?;
        refs.velocity = velocity;
        Ok(())
    }

    pub fn set_channel_velocity(
        &mut self,
        entity: EntityId,
        mover: &str,
        channel: &str,
        velocity: f64,
    ) -> MoverResult<()> {
        let any = self.mover_refs_mut(entity, mover)?;
        let found = any.kind();
        let AnyMoverRefs::Multi(refs) = any else {
            return Err(MoverError::KindMismatch {
                expected: MoverKind::Multi,
                found,
            });
        };
        let channel_refs = refs
            .channels
            .get_mut(channel)
            .ok_or_else(|| MoverError::UnknownChannel(channel.to_string()))?;
        channel_refs.velocity = velocity;
        Ok(())
    }

    /// Cancels a motion; any autorun loop ends before its next frame.
    pub fn stop(&mut self, entity: EntityId, mover: &str) -> MoverResult<()> {
        let keys = self.keys(entity, mover)?;
        self.set_state(entity, &keys.is_moving, StateValue::Flag(false))
    }

    /// Registers the handler called when the mover slows down.
    pub fn on_slow<F>(&mut self, entity: EntityId, mover: &str, handler: F) -> MoverResult<()>
    where
        F: FnMut(EntityId) + Send + Sync + 'static,
    {
        let keys = self.keys(entity, mover)?;
        self.slow_handlers.insert((entity, keys.refs), Box::new(handler));
        Ok(())
    }

    fn notify_slow(&mut self, report: &StepReport) {
        if !report.became_slow {
            return;
        }
        if let Some(handler) = self
            .slow_handlers
            .get_mut(&(report.entity, report.mover.clone()))
        {
            handler(report.entity);
        }
    }

    /// Steps one mover by one frame, whether or not it is moving.
    pub fn run_mover(
        &mut self,
        entity: EntityId,
        mover: &str,
        frame_duration: f64,
    ) -> MoverResult<StepReport> {
        let kind = self.kind(entity, mover)?;
        let report = movers::step_mover(
            self,
            kind,
            entity,
            &RefsKey::new(mover),
            clamp_frame(frame_duration),
        )?;
        self.notify_slow(&report);
        Ok(report)
    }

    /// Self-driven loop over `frames`, stopping once the mover is idle.
    pub fn autorun<I>(
        &mut self,
        entity: EntityId,
        mover: &str,
        frames: I,
    ) -> MoverResult<AutorunSummary>
    where
        I: IntoIterator<Item = f64>,
    {
        let kind = self.kind(entity, mover)?;
        let refs_key = RefsKey::new(mover);
        let handler_key = (entity, refs_key.clone());

        let mut handler = self.slow_handlers.remove(&handler_key);
        let mut notify = || {
            if let Some(handler) = handler.as_mut() {
                handler(entity);
            }
        };
        let callback: &mut dyn FnMut() = &mut notify;
        let result = movers::autorun(
            self,
            kind,
            entity,
            &refs_key,
            frames.into_iter().map(clamp_frame),
            Some(callback),
        );

        if let Some(handler) = handler {
            self.slow_handlers.insert(handler_key, handler);
        }
        result
    }

    /// Duration-driven tick: steps every moving mover without a time source.
    pub fn tick(&mut self, frame_duration: f64) -> TickSummary {
        self.step_selected(clamp_frame(frame_duration), Selection::Unassigned)
    }

    pub fn register_time_source(&mut self, name: impl Into<String>) -> bool {
        self.time_sources.register(name)
    }

    /// Moves a mover from the world tick onto the named clock.
    pub fn assign_time_source(
        &mut self,
        entity: EntityId,
        mover: &str,
        name: impl Into<String>,
    ) -> MoverResult<()> {
        let keys = self.keys(entity, mover)?;
        self.time_sources.assign(entity, keys.refs, name);
        Ok(())
    }

    /// Hands a mover back to the world tick.
    pub fn unassign_time_source(&mut self, entity: EntityId, mover: &str) -> Option<String> {
        self.time_sources.unassign(entity, &RefsKey::new(mover))
    }

    /// Steps the movers on clock `name` by the time passed since its last reading.
    pub fn advance_time_source(&mut self, name: &str, elapsed: f64) -> MoverResult<TickSummary> {
        let delta = self.time_sources.advance(name, elapsed)?;
        Ok(self.step_selected(clamp_frame(delta), Selection::Source(name)))
    }

    /// Steps the selected movers by `frame_duration`. No time passing means
    /// no step, so an unchanged clock never reaches the runners.
    fn step_selected(&mut self, frame_duration: f64, selection: Selection<'_>) -> TickSummary {
        if frame_duration <= 0.0 {
            log::trace!("no time elapsed for {selection:?}, skipping step");
            return TickSummary::default();
        }
        let started = Instant::now();
        let mut profile = TickProfile {
            entity_count: self.entities.len(),
            parallel: self.parallel_enabled,
            ..TickProfile::default()
        };

        let mut reports = {
            let _timer = ScopedTimer::new(&mut profile.step_time);
            step_entities(
                &mut self.entities,
                &self.time_sources,
                selection,
                self.parallel_enabled,
                frame_duration,
            )
        };
        reports.sort_by(|a, b| (a.entity, &a.mover).cmp(&(b.entity, &b.mover)));

        {
            let _timer = ScopedTimer::new(&mut profile.handler_time);
            for report in reports.iter().filter(|report| report.became_slow) {
                self.notify_slow(report);
            }
        }

        let summary = TickSummary {
            stepped: reports.len(),
            stopped: reports.iter().filter(|report| !report.still_moving).count(),
            slowed: reports.iter().filter(|report| report.became_slow).count(),
            reports,
        };

        profile.movers_stepped = summary.stepped;
        profile.movers_stopped = summary.stopped;
        profile.total_frame_time = started.elapsed();
        warn_if_frame_budget_exceeded(profile.total_frame_time, frame_duration);
        profile.report();
        self.profile = profile;

        summary
    }
}

impl MoverHost for MoverWorld {
    fn state(&self, entity: EntityId, key: &StateKey) -> Option<&StateValue> {
        self.entities.get(entity)?.state.get(key)
    }

    fn set_state(
        &mut self,
        entity: EntityId,
        key: &StateKey,
        value: StateValue,
    ) -> MoverResult<()> {
        let slot = self
            .entities
            .get_mut(entity)
            .ok_or(MoverError::UnknownEntity(entity))?;
        slot.state.insert(key.clone(), value);
        Ok(())
    }

    fn refs(&self, entity: EntityId, key: &RefsKey) -> Option<&AnyMoverRefs> {
        self.entities.get(entity)?.refs.get(key)
    }

    fn refs_mut(&mut self, entity: EntityId, key: &RefsKey) -> Option<&mut AnyMoverRefs> {
        self.entities.get_mut(entity)?.refs.get_mut(key)
    }
}

fn check_shape(kind: MoverKind, value: &StateValue, key: &StateKey) -> MoverResult<()> {
    let (matches, expected) = match kind {
        MoverKind::OneD => (
            matches!(value, StateValue::Scalar(_)),
            <f64 as MoverValue>::SHAPE,
        ),
        MoverKind::TwoD => (
            matches!(value, StateValue::Vec2(_)),
            <DVec2 as MoverValue>::SHAPE,
        ),
        MoverKind::ThreeD => (
            matches!(value, StateValue::Vec3(_)),
            <DVec3 as MoverValue>::SHAPE,
        ),
        MoverKind::Multi => (
            matches!(value, StateValue::Channels(_)),
            <ChannelValues as MoverValue>::SHAPE,
        ),
    };
    if matches {
        Ok(())
    } else {
        Err(MoverError::StateTypeMismatch {
            key: key.to_string(),
            expected,
        })
    }
}

fn step_entity(
    id: EntityId,
    entity: &mut Entity,
    sources: &TimeSources,
    selection: Selection<'_>,
    frame_duration: f64,
) -> Vec<StepReport> {
    let due: Vec<(RefsKey, MoverKind)> = entity
        .moving_movers()
        .into_iter()
        .filter(|(mover, _)| selection.includes(sources, id, mover))
        .collect();

    let mut slot = EntitySlot { id, entity };
    due.into_iter()
        .filter_map(|(mover, kind)| {
            match movers::step_mover(&mut slot, kind, id, &mover, frame_duration) {
                Ok(report) => Some(report),
                Err(err) => {
                    log::warn!("skipping mover `{mover}` on {id:?}: {err}");
                    None
                }
            }
        })
        .collect()
}

fn step_entities(
    entities: &mut Arena<Entity>,
    sources: &TimeSources,
    selection: Selection<'_>,
    parallel: bool,
    frame_duration: f64,
) -> Vec<StepReport> {
    if parallel {
        step_entities_parallel(entities, sources, selection, frame_duration)
    } else {
        step_entities_sequential(entities, sources, selection, frame_duration)
    }
}

fn step_entities_sequential(
    entities: &mut Arena<Entity>,
    sources: &TimeSources,
    selection: Selection<'_>,
    frame_duration: f64,
) -> Vec<StepReport> {
    let _span = TraceSpan::new("movers::tick::sequential", entities.len());
    entities
        .iter_mut_with_ids()
        .flat_map(|(id, entity)| step_entity(id, entity, sources, selection, frame_duration))
        .collect()
}

#[cfg(feature = "parallel")]
fn step_entities_parallel(
    entities: &mut Arena<Entity>,
    sources: &TimeSources,
    selection: Selection<'_>,
    frame_duration: f64,
) -> Vec<StepReport> {
    let _span = TraceSpan::new("movers::tick::parallel", entities.len());
    entities
        .par_iter_mut_with_ids()
        .flat_map_iter(|(id, entity)| step_entity(id, entity, sources, selection, frame_duration))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn step_entities_parallel(
    entities: &mut Arena<Entity>,
    sources: &TimeSources,
    selection: Selection<'_>,
    frame_duration: f64,
) -> Vec<StepReport> {
    step_entities_sequential(entities, sources, selection, frame_duration)
}
